//! Boolean groups packed eight to a byte, bit 0 first.
//!
//! The named fields are the model. The byte is derived on demand and never
//! stored as the source of truth.

/// Packs up to eight flags into one byte. Flags beyond the eighth are ignored.
pub fn pack_bits(flags: &[bool]) -> u8 {
    flags
        .iter()
        .take(8)
        .enumerate()
        .fold(0u8, |byte, (bit, set)| if *set { byte | (1 << bit) } else { byte })
}

pub fn unpack_bits(byte: u8) -> [bool; 8] {
    let mut flags = [false; 8];
    for (bit, flag) in flags.iter_mut().enumerate() {
        *flag = byte & (1 << bit) != 0;
    }
    flags
}

/// Declares a struct of named flags with a fixed bit position per field.
/// Unlisted bits are written as zero and ignored when read.
macro_rules! flag_byte {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $($bit:literal => $field:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name {
            $(pub $field: bool,)+
        }

        impl $name {
            pub fn to_byte(self) -> u8 {
                let mut byte = 0u8;
                $(
                    if self.$field {
                        byte |= 1 << $bit;
                    }
                )+
                byte
            }

            pub fn from_byte(byte: u8) -> Self {
                Self {
                    $($field: byte & (1 << $bit) != 0,)+
                }
            }
        }
    };
}

pub(crate) use flag_byte;

#[cfg(test)]
mod tests {
    use super::*;

    flag_byte! {
        pub struct Sparse {
            1 => second,
            6 => seventh,
        }
    }

    #[test]
    fn pack_bits_orders_low_bit_first() {
        assert_eq!(pack_bits(&[true, false, false, false, false, false, false, false]), 0x01);
        assert_eq!(pack_bits(&[false, false, false, false, false, false, false, true]), 0x80);
        assert_eq!(pack_bits(&[true, true]), 0x03);
        assert_eq!(pack_bits(&[]), 0);
    }

    #[test]
    fn unpack_inverts_pack_for_every_byte() {
        for byte in 0..=u8::MAX {
            assert_eq!(pack_bits(&unpack_bits(byte)), byte);
        }
    }

    #[test]
    fn flag_byte_uses_declared_positions() {
        let flags = Sparse {
            second: true,
            seventh: true,
        };
        assert_eq!(flags.to_byte(), 0b0100_0010);
        assert_eq!(Sparse::from_byte(0xff), flags);
        assert_eq!(Sparse::from_byte(0b1011_1101), Sparse::default());
    }
}
