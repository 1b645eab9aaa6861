//! Custom font conversion
//!
//! Custom fonts are rasterized into the device's bitmap font format by an
//! external converter. Converted fonts are cached per build, keyed by their
//! package filename (`font_custom_<size>_<bpp>.bin`).

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use hashbrown::HashMap;
use tracing::{debug, info};

use crate::error::ConversionError;

/// Conversion parameters for one custom font
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontParams {
    /// Output font name (package filename without `.bin`)
    pub name: String,
    pub size: u32,
    pub bpp: u8,
    /// Characters to include: the named charset followed by extra symbols
    pub symbols: String,
    /// Unicode ranges, e.g. "0x20-0x7F,0x4E00-0x9FFF"
    pub range: Option<String>,
}

/// Converts a TTF/OTF/WOFF font into device font bytes.
pub trait FontConvert: Send + Sync {
    fn convert(&self, font: &[u8], params: &FontParams) -> Result<Vec<u8>, ConversionError>;
}

/// Converted fonts of one build, keyed by package filename.
#[derive(Debug, Default)]
pub struct FontCache {
    entries: HashMap<String, Arc<Vec<u8>>>,
}

impl FontCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, filename: &str) -> Option<Arc<Vec<u8>>> {
        self.entries.get(filename).cloned()
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.entries.contains_key(filename)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every converted font.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Return the cached font or run `convert` and cache its output.
    pub fn get_or_convert<E>(
        &mut self,
        filename: &str,
        convert: impl FnOnce() -> Result<Vec<u8>, E>,
    ) -> Result<Arc<Vec<u8>>, E> {
        if let Some(cached) = self.entries.get(filename) {
            debug!("Font cache hit: {}", filename);
            return Ok(Arc::clone(cached));
        }
        let data = Arc::new(convert()?);
        self.entries.insert(filename.to_string(), Arc::clone(&data));
        Ok(data)
    }
}

/// Output format written by [`LvFontConvCommand`] unless overridden
pub const DEFAULT_FONT_FORMAT: &str = "cbin";

/// Runs the `lv_font_conv` executable.
#[derive(Debug, Clone)]
pub struct LvFontConvCommand {
    program: PathBuf,
    format: String,
}

impl LvFontConvCommand {
    /// Find `lv_font_conv` on PATH.
    pub fn locate() -> Result<Self, ConversionError> {
        let program = which::which("lv_font_conv").map_err(|e| {
            ConversionError::ConverterUnavailable(format!("lv_font_conv not found on PATH: {}", e))
        })?;
        Ok(Self::with_program(program))
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            format: DEFAULT_FONT_FORMAT.to_string(),
        }
    }

    /// Override the `--format` argument.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, input: &Path, output: &Path, params: &FontParams) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--font")
            .arg(input)
            .arg("--size")
            .arg(params.size.to_string())
            .arg("--bpp")
            .arg(params.bpp.to_string())
            .arg("--format")
            .arg(&self.format)
            .arg("--no-compress")
            .arg("-o")
            .arg(output);
        if !params.symbols.is_empty() {
            cmd.arg("--symbols").arg(&params.symbols);
        }
        if let Some(range) = params.range.as_deref().filter(|r| !r.is_empty()) {
            cmd.arg("-r").arg(range);
        }
        cmd
    }
}

impl FontConvert for LvFontConvCommand {
    fn convert(&self, font: &[u8], params: &FontParams) -> Result<Vec<u8>, ConversionError> {
        if params.symbols.is_empty() && params.range.as_deref().is_none_or(str::is_empty) {
            return Err(ConversionError::FontConverter(
                "no characters selected".to_string(),
            ));
        }

        let dir = tempfile::tempdir()?;
        let input = dir.path().join("source_font");
        let output = dir.path().join(format!("{}.bin", params.name));
        std::fs::write(&input, font)?;

        info!(
            "Converting font {} ({}px, {} bpp)",
            params.name, params.size, params.bpp
        );
        let result = self.command(&input, &output, params).output()?;
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(ConversionError::FontConverter(format!(
                "{} exited with {}: {}",
                self.program.display(),
                result.status,
                stderr.trim()
            )));
        }

        Ok(std::fs::read(&output)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> FontParams {
        FontParams {
            name: "font_custom_20_4".to_string(),
            size: 20,
            bpp: 4,
            symbols: "abc".to_string(),
            range: Some("0x4E00-0x4E10".to_string()),
        }
    }

    #[test]
    fn test_cache_converts_once() {
        let mut cache = FontCache::new();
        let mut calls = 0;

        for _ in 0..3 {
            let data = cache
                .get_or_convert::<ConversionError>("font_custom_20_4.bin", || {
                    calls += 1;
                    Ok(vec![1, 2, 3])
                })
                .unwrap();
            assert_eq!(*data, vec![1, 2, 3]);
        }

        assert_eq!(calls, 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains("font_custom_20_4.bin"));
    }

    #[test]
    fn test_cache_failure_is_not_cached() {
        let mut cache = FontCache::new();
        let result = cache.get_or_convert("font.bin", || {
            Err(ConversionError::FontConverter("boom".to_string()))
        });
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_clear_forces_reconversion() {
        let mut cache = FontCache::new();
        let mut calls = 0;
        let mut convert = |cache: &mut FontCache| {
            cache
                .get_or_convert::<ConversionError>("font.bin", || {
                    calls += 1;
                    Ok(vec![calls])
                })
                .unwrap()
        };

        assert_eq!(*convert(&mut cache), vec![1]);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(*convert(&mut cache), vec![2]);
    }

    #[test]
    fn test_command_arguments() {
        let conv = LvFontConvCommand::with_program("/usr/bin/lv_font_conv").with_format("bin");
        let cmd = conv.command(Path::new("in.ttf"), Path::new("out.bin"), &params());
        let args: Vec<_> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            args,
            [
                "--font",
                "in.ttf",
                "--size",
                "20",
                "--bpp",
                "4",
                "--format",
                "bin",
                "--no-compress",
                "-o",
                "out.bin",
                "--symbols",
                "abc",
                "-r",
                "0x4E00-0x4E10",
            ]
        );
    }

    #[test]
    fn test_default_format() {
        let conv = LvFontConvCommand::with_program("lv_font_conv");
        let cmd = conv.command(Path::new("a"), Path::new("b"), &params());
        assert!(cmd.get_args().any(|a| a == DEFAULT_FONT_FORMAT));
    }

    #[test]
    fn test_empty_selection_rejected() {
        let conv = LvFontConvCommand::with_program("lv_font_conv");
        let mut p = params();
        p.symbols.clear();
        p.range = None;
        assert!(matches!(
            conv.convert(&[], &p),
            Err(ConversionError::FontConverter(_))
        ));
    }
}
