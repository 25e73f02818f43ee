use core::fmt;

/// Return a shortened version of the function name.
#[macro_export]
macro_rules! short_function {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            core::any::type_name::<T>()
        }
        let name = type_name_of(f);

        // Find and cut the rest of the path
        match &name[..name.len() - 3].rfind(':') {
            Some(pos) => &name[pos + 1..name.len() - 3],
            None => &name[..name.len() - 3],
        }
    }};
}

/// Log bytes as hex, abbreviated when long
#[macro_export]
macro_rules! log_bytes {
    ($obj: expr) => {
        $crate::util::macro_logger::DebugBytes(&$obj)
    };
}

/// Hex formatting of a byte slice for log lines.
///
/// Slices longer than [`DebugBytes::MAX_LEN`] are cut and suffixed with the
/// total length.
pub struct DebugBytes<'a>(pub &'a [u8]);

impl<'a> DebugBytes<'a> {
    /// Longest slice printed in full
    pub const MAX_LEN: usize = 64;
}

impl<'a> fmt::Display for DebugBytes<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.len() <= Self::MAX_LEN {
            write!(f, "{}", hex::encode(self.0))
        } else {
            write!(f, "{}..[{} bytes]", hex::encode(&self.0[..Self::MAX_LEN]), self.0.len())
        }
    }
}

impl<'a> fmt::Debug for DebugBytes<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
