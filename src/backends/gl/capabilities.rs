use std::cmp;
use std::ffi;

use gl;
use gl::types::*;

use crate::errors::*;

/// Describes a version.
///
/// A version can only be compared to another version if they belong to the
/// same API. For example, both `Version::GL(3, 0) >= Version::ES(3, 0)` and
/// `Version::ES(3, 0) >= Version::GL(3, 0)` return `false`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Version {
    /// Regular OpenGL.
    GL(u8, u8),
    /// OpenGL embedded system.
    ES(u8, u8),
}

impl PartialOrd for Version {
    #[inline]
    fn partial_cmp(&self, other: &Version) -> Option<cmp::Ordering> {
        let (es1, major1, minor1) = match *self {
            Version::GL(major, minor) => (false, major, minor),
            Version::ES(major, minor) => (true, major, minor),
        };

        let (es2, major2, minor2) = match *other {
            Version::GL(major, minor) => (false, major, minor),
            Version::ES(major, minor) => (true, major, minor),
        };

        if es1 != es2 {
            None
        } else {
            match major1.cmp(&major2) {
                cmp::Ordering::Equal => Some(minor1.cmp(&minor2)),
                v => Some(v),
            }
        }
    }
}

impl Version {
    /// Obtains the OpenGL version of the current context using the loaded
    /// functions.
    ///
    /// # Safety
    ///
    /// You must ensure that the functions belong to the current context,
    /// otherwise you will get an undefined behavior.
    pub unsafe fn parse() -> Result<Version> {
        let desc = parse_str(gl::VERSION)?;

        let (es, desc) = if desc.starts_with("OpenGL ES ") {
            (true, &desc[10..])
        } else if desc.starts_with("OpenGL ES-") {
            (true, &desc[13..])
        } else {
            (false, &desc[..])
        };

        let desc = desc
            .split(' ')
            .next()
            .ok_or_else(|| Error::Backend("[GL] Version string is unformaled.".into()))?;

        let mut iter = desc.split(move |c: char| c == '.');
        let major = iter
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| Error::Backend("[GL] Version string is unformaled.".into()))?;
        let minor = iter
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| Error::Backend("[GL] Version string is unformaled.".into()))?;

        if es {
            Ok(Version::ES(major, minor))
        } else {
            Ok(Version::GL(major, minor))
        }
    }
}

/// Represents the capabilities of the context.
///
/// Contrary to the mutable rendering state, these values never change.
#[derive(Debug)]
pub struct Capabilities {
    /// Returns a version or release number.
    pub version: Version,
    /// The company responsible for this GL implementation.
    pub vendor: String,
    /// The name of the renderer, typically specific to a particular
    /// configuration of a hardware platform.
    pub renderer: String,
}

impl Capabilities {
    pub unsafe fn parse() -> Result<Capabilities> {
        Ok(Capabilities {
            version: Version::parse()?,
            vendor: parse_str(gl::VENDOR)?,
            renderer: parse_str(gl::RENDERER)?,
        })
    }
}

#[inline]
unsafe fn parse_str(id: GLenum) -> Result<String> {
    let s = gl::GetString(id);
    if s.is_null() {
        return Err(Error::Backend(format!("[GL] String of {} is null.", id)));
    }

    String::from_utf8(ffi::CStr::from_ptr(s as *const _).to_bytes().to_vec())
        .map_err(|_| Error::Backend(format!("[GL] String of {} is unformaled.", id)))
}
