// Copyright 2025 the vantage authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Vantage sandbox: headless shell for the demo scenes.

use std::path::PathBuf;

use anyhow::Result;

mod app;
mod assets;
mod config;

use app::App;
use config::AppConfig;

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => {
            log::info!("loading config from {}", path.display());
            AppConfig::load(&path)?
        }
        None => AppConfig::default(),
    };
    log::info!(
        "running scene '{:?}' at {}x{} for {} frame(s)",
        config.scene,
        config.width,
        config.height,
        config.frames
    );

    let mut app = App::new(config)?;
    app.init()?;
    app.run()?;
    app.shutdown();

    Ok(())
}
