//! C ABI for language bindings (Ruby, Node.js, Python, etc.). Mirrors the
//! `fastqr.h` header: a POD options struct, `fastqr_generate` returning
//! 1/0, and a process-local last-error string. Panics never cross the
//! boundary.

use std::ffi::{c_char, c_int, CStr, CString};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Mutex;

use crate::error::{QRError, QRResult};
use crate::metadata::ECLevel;

// Options struct
//------------------------------------------------------------------------------

/// FFI twin of [`crate::QROptions`], laid out exactly as in `fastqr.h`.
/// `logo_path` and `format` are nullable NUL-terminated strings.
#[repr(C)]
pub struct QROptions {
    pub size: c_int,
    /// boolean: 0 or 1
    pub optimize_size: c_int,
    pub foreground_r: u8,
    pub foreground_g: u8,
    pub foreground_b: u8,
    pub background_r: u8,
    pub background_g: u8,
    pub background_b: u8,
    /// 0=LOW, 1=MEDIUM, 2=QUARTILE, 3=HIGH
    pub ec_level: c_int,
    pub logo_path: *const c_char,
    pub logo_size_percent: c_int,
    pub format: *const c_char,
    pub quality: c_int,
}

// Safety: `opts` must point to a valid struct whose string fields are
// null or valid NUL-terminated strings.
unsafe fn convert_options(opts: *const QROptions) -> QRResult<crate::QROptions> {
    if opts.is_null() {
        return Ok(crate::QROptions::default());
    }
    let opts = &*opts;
    let defaults = crate::QROptions::default();

    if opts.size <= 0 {
        return Err(QRError::InvalidInput);
    }

    let logo_path = match nullable_str(opts.logo_path)? {
        Some(s) if !s.is_empty() => Some(s.into()),
        _ => None,
    };
    let format = match nullable_str(opts.format)? {
        Some(s) if !s.is_empty() => s.parse()?,
        _ => defaults.format,
    };

    Ok(crate::QROptions {
        size: opts.size as u32,
        optimize_size: opts.optimize_size != 0,
        foreground: [opts.foreground_r, opts.foreground_g, opts.foreground_b],
        background: [opts.background_r, opts.background_g, opts.background_b],
        ec_level: ECLevel::from_index(opts.ec_level),
        logo_path,
        logo_size_percent: opts.logo_size_percent.clamp(0, 100) as u32,
        format,
        quality: opts.quality.clamp(1, 100) as u8,
    })
}

unsafe fn nullable_str<'a>(ptr: *const c_char) -> QRResult<Option<&'a str>> {
    if ptr.is_null() {
        return Ok(None);
    }
    CStr::from_ptr(ptr).to_str().map(Some).map_err(|_| QRError::InvalidInput)
}

// Last error
//------------------------------------------------------------------------------

static LAST_ERROR: Mutex<Option<CString>> = Mutex::new(None);

fn set_last_error(err: Option<QRError>) {
    let msg = err.and_then(|e| CString::new(e.to_string()).ok());
    if let Ok(mut slot) = LAST_ERROR.lock() {
        *slot = msg;
    }
}

/// Returns the diagnostic string for the most recent failed call, or null.
/// The pointer stays valid until the next failing `fastqr_generate`.
#[no_mangle]
pub extern "C" fn fastqr_last_error() -> *const c_char {
    match LAST_ERROR.lock() {
        Ok(slot) => slot.as_ref().map_or(std::ptr::null(), |s| s.as_ptr()),
        Err(_) => std::ptr::null(),
    }
}

// Entry points
//------------------------------------------------------------------------------

/// Generates a QR code image for `data` and writes it to `output_path`.
/// `options` may be null for all defaults. Returns 1 on success, 0 on any
/// failure.
///
/// # Safety
///
/// `data` and `output_path` must be valid NUL-terminated strings and
/// `options`, when non-null, must point to a valid [`QROptions`].
#[no_mangle]
pub unsafe extern "C" fn fastqr_generate(
    data: *const c_char,
    output_path: *const c_char,
    options: *const QROptions,
) -> c_int {
    let res = panic::catch_unwind(AssertUnwindSafe(|| -> QRResult<()> {
        if data.is_null() || output_path.is_null() {
            return Err(QRError::InvalidInput);
        }
        let data = CStr::from_ptr(data).to_bytes();
        let path = nullable_str(output_path)?.unwrap_or_default();
        let opts = convert_options(options)?;
        crate::generate(data, path, &opts)
    }));

    match res {
        Ok(Ok(())) => {
            set_last_error(None);
            1
        }
        Ok(Err(e)) => {
            set_last_error(Some(e));
            0
        }
        Err(_) => {
            set_last_error(Some(QRError::EncodingError));
            0
        }
    }
}

/// Returns the library version as a static string.
#[no_mangle]
pub extern "C" fn fastqr_version() -> *const c_char {
    static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod ffi_tests {
    use std::ffi::{CStr, CString};
    use std::ptr;
    use std::sync::Mutex;

    use super::{fastqr_generate, fastqr_last_error, fastqr_version, QROptions};

    // LAST_ERROR is process-global, so calls from concurrent tests would
    // race on it
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    fn default_ffi_options() -> QROptions {
        QROptions {
            size: 300,
            optimize_size: 0,
            foreground_r: 0,
            foreground_g: 0,
            foreground_b: 0,
            background_r: 255,
            background_g: 255,
            background_b: 255,
            ec_level: 1,
            logo_path: ptr::null(),
            logo_size_percent: 20,
            format: ptr::null(),
            quality: 95,
        }
    }

    #[test]
    fn test_version_string() {
        let _guard = TEST_LOCK.lock().unwrap();
        let v = unsafe { CStr::from_ptr(fastqr_version()) };
        assert_eq!(v.to_str().unwrap(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_generate_with_null_options() {
        let _guard = TEST_LOCK.lock().unwrap();
        let data = CString::new("hello from c").unwrap();
        let path = std::env::temp_dir().join("fastqr_ffi_null_opts.png");
        let cpath = CString::new(path.to_str().unwrap()).unwrap();
        let ret = unsafe { fastqr_generate(data.as_ptr(), cpath.as_ptr(), ptr::null()) };
        assert_eq!(ret, 1);
        assert!(path.exists());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_generate_null_data_fails() {
        let _guard = TEST_LOCK.lock().unwrap();
        let path = CString::new("/tmp/fastqr_never_written.png").unwrap();
        let ret = unsafe { fastqr_generate(ptr::null(), path.as_ptr(), ptr::null()) };
        assert_eq!(ret, 0);
        let err = unsafe { CStr::from_ptr(fastqr_last_error()) };
        assert_eq!(err.to_str().unwrap(), "empty or invalid input");
    }

    #[test]
    fn test_generate_rejects_non_positive_size() {
        let _guard = TEST_LOCK.lock().unwrap();
        let data = CString::new("hello").unwrap();
        let path = CString::new("/tmp/fastqr_never_written.png").unwrap();
        let mut opts = default_ffi_options();
        opts.size = 0;
        let ret = unsafe { fastqr_generate(data.as_ptr(), path.as_ptr(), &opts) };
        assert_eq!(ret, 0);
    }

    #[test]
    fn test_generate_rejects_unknown_format() {
        let _guard = TEST_LOCK.lock().unwrap();
        let data = CString::new("hello").unwrap();
        let path = std::env::temp_dir().join("fastqr_ffi_bad_format.gif");
        let cpath = CString::new(path.to_str().unwrap()).unwrap();
        let format = CString::new("gif").unwrap();
        let mut opts = default_ffi_options();
        opts.format = format.as_ptr();
        let ret = unsafe { fastqr_generate(data.as_ptr(), cpath.as_ptr(), &opts) };
        assert_eq!(ret, 0);
        assert!(!path.exists());
    }

    // Out-of-range EC indices fall back to level M instead of failing
    #[test]
    fn test_generate_with_bad_ec_index() {
        let _guard = TEST_LOCK.lock().unwrap();
        let data = CString::new("hello").unwrap();
        let path = std::env::temp_dir().join("fastqr_ffi_bad_ec.png");
        let cpath = CString::new(path.to_str().unwrap()).unwrap();
        let mut opts = default_ffi_options();
        opts.ec_level = 42;
        let ret = unsafe { fastqr_generate(data.as_ptr(), cpath.as_ptr(), &opts) };
        assert_eq!(ret, 1);
        std::fs::remove_file(&path).unwrap();
    }
}
