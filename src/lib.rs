//! WMF to SVG Converter
//!
//! Plays a Windows Metafile record stream against a simulated device context
//! and writes the resulting drawing as an SVG document.
//!
//! ```no_run
//! let data = std::fs::read("drawing.wmf").unwrap();
//! let svg = wmf_converter::convert(&data).unwrap();
//! ```

pub mod bitmap;
pub mod charset;
pub mod converter;
pub mod cursor;
pub mod device_context;
pub mod error;
pub mod header;
pub mod instruction;
pub mod mapper;
pub mod objects;
pub mod player;
pub mod records;
pub mod svg_writer;
pub mod types;

use log::LevelFilter;

pub use converter::{decode_instructions, Conversion, ConvertOptions, Converter, DriverState};
pub use error::{ConfigError, ConversionError, ConversionResult, ErrorKind};
pub use header::is_wmf_format;
pub use instruction::Instruction;

/// Convert WMF data to an SVG string with default options.
pub fn convert(data: &[u8]) -> ConversionResult<String> {
    convert_with_options(data, &ConvertOptions::default())
}

pub fn convert_with_options(data: &[u8], options: &ConvertOptions) -> ConversionResult<String> {
    convert_with_report(data, options).map(|conversion| conversion.svg)
}

/// Convert and keep the element list, warnings and parsed header.
pub fn convert_with_report(data: &[u8], options: &ConvertOptions) -> ConversionResult<Conversion> {
    Converter::new(data, options.clone()).run()
}

/// Set the process-wide log level: "error", "warn", "info", "debug" or "trace".
///
/// Unrecognized values are rejected and leave the level unchanged.
pub fn set_log_level(level: &str) -> Result<(), ConfigError> {
    let filter = match level.trim().to_ascii_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => return Err(ConfigError::UnknownLogLevel(level.to_string())),
    };
    log::set_max_level(filter);
    Ok(())
}
