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

//! A macro to define bitflags in a structured way.
#[macro_export]
#[doc(hidden)]
macro_rules! vantage_bitflags {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident: $ty:ty {
            $(
                $(#[$flag_attr:meta])*
                const $flag_name:ident = $flag_value:expr;
            )*
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name {
            pub(crate) bits: $ty,
        }

        impl $name {
            /// An empty set of flags.
            pub const EMPTY: Self = Self { bits: 0 };

            /// Creates a flag set from raw bits. Unknown bits are kept.
            pub const fn from_bits_truncate(bits: $ty) -> Self {
                Self { bits }
            }

            /// Returns the raw value of the flag set.
            pub const fn bits(&self) -> $ty {
                self.bits
            }

            /// Returns `true` if no flag is set.
            pub const fn is_empty(&self) -> bool {
                self.bits == 0
            }

            /// Returns `true` if all flags in `other` are contained within `self`.
            pub const fn contains(&self, other: Self) -> bool {
                (self.bits & other.bits) == other.bits
            }

            /// Returns `true` if any flag in `other` is contained within `self`.
            pub const fn intersects(&self, other: Self) -> bool {
                (self.bits & other.bits) != 0
            }

            /// Inserts the flags in `other` into `self`.
            pub fn insert(&mut self, other: Self) {
                self.bits |= other.bits;
            }

            /// Removes the flags in `other` from `self`.
            pub fn remove(&mut self, other: Self) {
                self.bits &= !other.bits;
            }

            // Define the individual flag constants
            $(
                $(#[$flag_attr])*
                pub const $flag_name: Self = Self { bits: $flag_value };
            )*
        }

        impl core::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, other: Self) -> Self {
                Self { bits: self.bits | other.bits }
            }
        }

        impl core::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, other: Self) {
                self.bits |= other.bits;
            }
        }

        impl core::ops::BitAnd for $name {
            type Output = Self;
            fn bitand(self, other: Self) -> Self {
                Self { bits: self.bits & other.bits }
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let mut bits = self.bits;
                let mut first = true;

                write!(f, "{} {{ ", stringify!($name))?;

                $(
                    if ($flag_value != 0) && (bits & $flag_value) == $flag_value {
                        if !first {
                            write!(f, " | ")?;
                        }
                        write!(f, "{}", stringify!($flag_name))?;
                        bits &= !$flag_value;
                        first = false;
                    }
                )*

                if bits != 0 {
                    if !first {
                        write!(f, " | ")?;
                    }
                    write!(f, "UNKNOWN({:#x})", bits)?;
                    first = false;
                }

                if self.bits == 0 && first {
                    write!(f, "EMPTY")?;
                }

                write!(f, " }}")
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::vantage_bitflags;

    vantage_bitflags! {
        /// Flags used to verify the macro expansion.
        pub struct TestFlags: u32 {
            const A = 1 << 0;
            const B = 1 << 1;
            const C = 1 << 2;
            const AC = Self::A.bits() | Self::C.bits();
        }
    }

    #[test]
    fn empty_flags() {
        let flags = TestFlags::EMPTY;
        assert_eq!(flags.bits(), 0);
        assert!(flags.is_empty());
        assert!(flags.contains(TestFlags::EMPTY));
        assert!(!flags.contains(TestFlags::A));
        assert_eq!(format!("{flags:?}"), "TestFlags { EMPTY }");
    }

    #[test]
    fn combine_and_query() {
        let flags = TestFlags::A | TestFlags::C;
        assert_eq!(flags, TestFlags::AC);
        assert!(flags.contains(TestFlags::A));
        assert!(flags.intersects(TestFlags::C | TestFlags::B));
        assert!(!flags.intersects(TestFlags::B));
        assert_eq!(format!("{flags:?}"), "TestFlags { A | C }");
    }

    #[test]
    fn insert_and_remove() {
        let mut flags = TestFlags::A;
        flags.insert(TestFlags::B);
        assert!(flags.contains(TestFlags::A | TestFlags::B));

        flags.remove(TestFlags::A);
        assert_eq!(flags, TestFlags::B);
    }

    #[test]
    fn unknown_bits_are_reported() {
        let flags = TestFlags::from_bits_truncate(1 << 8);
        assert_eq!(format!("{flags:?}"), "TestFlags { UNKNOWN(0x100) }");
    }
}
