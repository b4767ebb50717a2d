/// Trait for types that serialize to and from a fixed number of bytes.
///
/// Keys and values stored in hash table block pages go through this trait;
/// the block layout math relies on `serialized_size` being constant for the
/// type.
pub trait BytesSerialize: Sized {
    /// Number of bytes this type occupies when serialized.
    fn serialized_size() -> usize;
    fn to_bytes(&self) -> Vec<u8>;
    /// Deserialize from exactly `serialized_size()` bytes. The slice length
    /// is guaranteed by the page layouts that call this.
    fn from_bytes(bytes: &[u8]) -> Self;
}

macro_rules! impl_bytes_serialize_number {
    ($t:ty) => {
        impl BytesSerialize for $t {
            fn serialized_size() -> usize {
                std::mem::size_of::<$t>()
            }

            fn to_bytes(&self) -> Vec<u8> {
                self.to_be_bytes().to_vec()
            }

            fn from_bytes(bytes: &[u8]) -> Self {
                <$t>::from_be_bytes(bytes.try_into().unwrap())
            }
        }
    };
}

impl_bytes_serialize_number!(u8);
impl_bytes_serialize_number!(u16);
impl_bytes_serialize_number!(u32);
impl_bytes_serialize_number!(u64);
impl_bytes_serialize_number!(u128);
impl_bytes_serialize_number!(i8);
impl_bytes_serialize_number!(i16);
impl_bytes_serialize_number!(i32);
impl_bytes_serialize_number!(i64);
impl_bytes_serialize_number!(i128);

impl BytesSerialize for f32 {
    fn serialized_size() -> usize {
        4
    }

    fn to_bytes(&self) -> Vec<u8> {
        self.to_bits().to_be_bytes().to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Self {
        f32::from_bits(u32::from_be_bytes(bytes.try_into().unwrap()))
    }
}

impl BytesSerialize for f64 {
    fn serialized_size() -> usize {
        8
    }

    fn to_bytes(&self) -> Vec<u8> {
        self.to_bits().to_be_bytes().to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Self {
        f64::from_bits(u64::from_be_bytes(bytes.try_into().unwrap()))
    }
}

impl BytesSerialize for bool {
    fn serialized_size() -> usize {
        1
    }

    fn to_bytes(&self) -> Vec<u8> {
        vec![u8::from(*self)]
    }

    fn from_bytes(bytes: &[u8]) -> Self {
        match bytes[0] {
            0 => false,
            1 => true,
            _ => panic!("Invalid bool value"),
        }
    }
}

macro_rules! impl_bytes_serialize_tuple {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: BytesSerialize),+> BytesSerialize for ($($name,)+) {
            fn serialized_size() -> usize {
                0 $(+ $name::serialized_size())+
            }

            fn to_bytes(&self) -> Vec<u8> {
                let mut bytes = Vec::with_capacity(Self::serialized_size());
                $(bytes.extend(self.$idx.to_bytes());)+
                bytes
            }

            fn from_bytes(bytes: &[u8]) -> Self {
                let mut offset = 0;
                ($(
                    {
                        let field =
                            $name::from_bytes(&bytes[offset..offset + $name::serialized_size()]);
                        offset += $name::serialized_size();
                        let _ = offset;
                        field
                    },
                )+)
            }
        }
    };
}

impl_bytes_serialize_tuple!(A: 0, B: 1);
impl_bytes_serialize_tuple!(A: 0, B: 1, C: 2);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    fn test_number_round_trip() {
        let value: u32 = 0xDEAD_BEEF;
        assert_eq!(value.to_bytes(), vec![0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(u32::from_bytes(&value.to_bytes()), value);

        let value: i64 = -40;
        assert_eq!(i64::from_bytes(&value.to_bytes()), value);
    }

    #[rstest]
    fn test_float_round_trip() {
        let value: f64 = -1234.5678;
        assert_eq!(f64::from_bytes(&value.to_bytes()), value);
    }

    #[rstest]
    fn test_tuple_round_trip() {
        let value: (u32, bool) = (77, true);
        assert_eq!(<(u32, bool)>::serialized_size(), 5);
        assert_eq!(<(u32, bool)>::from_bytes(&value.to_bytes()), value);

        let value: (f64, u32, bool) = (0.5, 9, false);
        assert_eq!(<(f64, u32, bool)>::serialized_size(), 13);
        assert_eq!(<(f64, u32, bool)>::from_bytes(&value.to_bytes()), value);
    }

    #[rstest]
    #[should_panic(expected = "Invalid bool value")]
    fn test_invalid_bool() {
        bool::from_bytes(&[2]);
    }
}
