//! Little-endian serialization used when emitting RIFF structures.

pub trait WriteBytesLe {
    fn write_le(&self, dst: &mut Vec<u8>);
}

macro_rules! impl_num_le {
    ($($t:ty),+) => { $(
        impl WriteBytesLe for $t { #[inline] fn write_le(&self, dst: &mut Vec<u8>) { dst.extend_from_slice(&self.to_le_bytes()); }}
    )+ }
}

impl_num_le!(u8, i8, u16, i16, u32, i32, u64, i64);

impl<T: WriteBytesLe> WriteBytesLe for Vec<T> {
    #[inline]
    fn write_le(&self, dst: &mut Vec<u8>) {
        self.iter().for_each(|item| item.write_le(dst));
    }
}

impl<T: WriteBytesLe, const N: usize> WriteBytesLe for [T; N] {
    #[inline]
    fn write_le(&self, dst: &mut Vec<u8>) {
        self.iter().for_each(|item| item.write_le(dst));
    }
}

impl<T: WriteBytesLe + ?Sized> WriteBytesLe for &T {
    #[inline]
    fn write_le(&self, dst: &mut Vec<u8>) {
        (**self).write_le(dst);
    }
}

impl WriteBytesLe for [u8] {
    #[inline]
    fn write_le(&self, dst: &mut Vec<u8>) {
        dst.extend_from_slice(self);
    }
}

/// Concatenates the little-endian encodings of the given values.
///
/// `WriteBytesLe` must be in scope at the call site.
#[macro_export]
macro_rules! join_bytes_le {
    ( $($value:expr),+ $(,)? ) => {{
        let mut vec = Vec::<u8>::new();
        $( $value.write_le(&mut vec); )+
        vec
    }};
}

#[allow(unused_imports)]
pub use join_bytes_le;
