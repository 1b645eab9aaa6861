//! Package build orchestration
//!
//! A build runs in four phases:
//!
//! 1. validate the configuration and resolve it into a [`ResourcePlan`]
//! 2. convert the custom font (if any) into the build's [`FontCache`]
//! 3. materialize every planned resource in parallel
//! 4. check the manifest against the materialized files and encode them
//!    with a fresh [`PackageEncoder`], `index.json` first
//!
//! The first failure aborts the build; nothing is written until all
//! resources have been produced.

use std::path::Path;
use std::sync::Arc;

use assetpack_common::{Dimensions, ModelSetEncoder, PackageEncoder, PackagingError};
use assetpack_shared::fs::{MAX_FONT_BYTES, MAX_IMAGE_BYTES, lowercase_extension, read_file_with_limit};
use assetpack_shared::models::{MODEL_MEMBER_FILES, charset_path, model_file_path};
use assetpack_shared::{BuildConfig, CustomFontConfig, ImageSize, IndexManifest, PACKAGE_FORMAT};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::background::convert_background;
use crate::error::{BuildError, ConversionError, FetchError};
use crate::fetch::RemoteFetch;
use crate::font::{FontCache, FontConvert, FontParams, LvFontConvCommand};
use crate::plan::{PlannedResource, ResourceKind, ResourcePlan, ResourceSource};
use crate::progress::Progress;
use crate::scale::{EmojiScaler, ImageScale, image_dimensions};

/// Charset used when a custom font selects no characters at all
const DEFAULT_CHARSET: &str = "basic";

/// A package file ready for encoding
#[derive(Debug, Clone)]
pub struct LogicalResource {
    pub kind: ResourceKind,
    pub filename: String,
    pub data: Vec<u8>,
    /// Directory entry size; inferred from the payload when `None`
    pub dimensions: Option<Dimensions>,
}

/// State owned by one build. Reset when a build starts; afterwards it holds
/// that build's converted fonts.
#[derive(Debug, Default)]
pub struct BuildContext {
    fonts: FontCache,
}

impl BuildContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fonts(&self) -> &FontCache {
        &self.fonts
    }
}

/// Turns a [`BuildConfig`] into `assets.bin` bytes.
pub struct AssetsBuilder {
    fetcher: Arc<dyn RemoteFetch>,
    font_converter: Option<Arc<dyn FontConvert>>,
    scaler: Option<Arc<dyn ImageScale>>,
}

impl AssetsBuilder {
    /// Builder fetching presets from `fetcher`.
    ///
    /// Custom fonts go through `lv_font_conv` and emoji through [`EmojiScaler`]
    /// unless other collaborators are supplied.
    pub fn new(fetcher: impl RemoteFetch + 'static) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            font_converter: None,
            scaler: None,
        }
    }

    pub fn with_font_converter(mut self, converter: impl FontConvert + 'static) -> Self {
        self.font_converter = Some(Arc::new(converter));
        self
    }

    pub fn with_scaler(mut self, scaler: impl ImageScale + 'static) -> Self {
        self.scaler = Some(Arc::new(scaler));
        self
    }

    /// Validate `config` and resolve its resources without materializing them.
    pub fn plan(&self, config: &BuildConfig) -> Result<ResourcePlan, BuildError> {
        config.validate()?;
        Ok(ResourcePlan::from_config(config))
    }

    pub fn build(&self, config: &BuildConfig) -> Result<Vec<u8>, BuildError> {
        self.build_with_progress(config, &mut |_, _| {})
    }

    /// Build with a fresh [`BuildContext`], reporting progress as (percent, message).
    pub fn build_with_progress(
        &self,
        config: &BuildConfig,
        progress: &mut dyn FnMut(f32, &str),
    ) -> Result<Vec<u8>, BuildError> {
        self.build_in(&mut BuildContext::new(), config, progress)
    }

    /// Build into `ctx`. Fonts converted by an earlier build are discarded first.
    pub fn build_in(
        &self,
        ctx: &mut BuildContext,
        config: &BuildConfig,
        progress: &mut dyn FnMut(f32, &str),
    ) -> Result<Vec<u8>, BuildError> {
        let mut progress = Progress::new(progress);
        progress.report(0.0, "Starting build");
        ctx.fonts.clear();

        let plan = self.plan(config)?;
        info!(
            "Building package for {} with {} resources",
            config.chip.model,
            plan.resources.len() + 1
        );

        if let Some((filename, custom)) = plan.custom_font() {
            progress.report(20.0, "Converting custom font");
            self.convert_font(ctx, filename, custom)?;
        }

        progress.report(40.0, "Preparing resource files");
        let resources = self.materialize(ctx, config, &plan)?;
        progress.report(80.0, "Resource files ready");

        check_manifest(&plan.manifest, &resources)?;

        progress.report(90.0, "Generating package");
        let bytes = encode(&plan.manifest, resources, &mut |p, message| {
            progress.report_within(90.0, 100.0, p, message)
        })?;

        progress.report(100.0, "Done");
        info!("Package built: {} bytes", bytes.len());
        Ok(bytes)
    }

    /// Produce the bytes of every planned resource, in plan order.
    pub fn materialize(
        &self,
        ctx: &BuildContext,
        config: &BuildConfig,
        plan: &ResourcePlan,
    ) -> Result<Vec<LogicalResource>, BuildError> {
        let scaler: Arc<dyn ImageScale> = match &self.scaler {
            Some(scaler) => Arc::clone(scaler),
            None => Arc::new(EmojiScaler::new(config.scaling)),
        };
        let display = (config.chip.display.width, config.chip.display.height);

        plan.resources
            .par_iter()
            .map(|resource| -> Result<LogicalResource, BuildError> {
                debug!("Materializing {} ({})", resource.filename, resource.kind);
                let data = match &resource.source {
                    ResourceSource::ModelGroup { model, .. } => {
                        self.pack_models(&resource.filename, model)?
                    }
                    ResourceSource::Preset { path } => self
                        .fetcher
                        .fetch(path)
                        .map_err(|e| BuildError::fetch(&resource.filename, e))?,
                    ResourceSource::CustomFont(_) => ctx
                        .fonts
                        .get(&resource.filename)
                        .map(|font| font.to_vec())
                        .ok_or_else(|| {
                            BuildError::conversion(
                                &resource.filename,
                                ConversionError::FontConverter("font was not converted".to_string()),
                            )
                        })?,
                    ResourceSource::CustomEmoji { file, target } => {
                        custom_emoji(scaler.as_ref(), resource, file, *target)?
                    }
                    ResourceSource::Background { file, .. } => {
                        let data = read_user_file(&resource.filename, file, MAX_IMAGE_BYTES)?;
                        convert_background(&data, display.0, display.1)
                            .map_err(|e| BuildError::conversion(&resource.filename, e))?
                    }
                };
                let dimensions = resource
                    .size
                    .map(|size| Dimensions::try_from_u32(size.width, size.height))
                    .transpose()
                    .map_err(|e| BuildError::conversion(&resource.filename, e))?;
                Ok(LogicalResource {
                    kind: resource.kind,
                    filename: resource.filename.clone(),
                    data,
                    dimensions,
                })
            })
            .collect()
    }

    fn convert_font(
        &self,
        ctx: &mut BuildContext,
        filename: &str,
        custom: &CustomFontConfig,
    ) -> Result<(), BuildError> {
        ctx.fonts.get_or_convert::<BuildError>(filename, || {
            let file = custom.file.as_deref().ok_or_else(|| {
                BuildError::fetch(filename, FetchError::NotFound("custom font file".to_string()))
            })?;
            let font = read_user_file(filename, file, MAX_FONT_BYTES)?;
            let params = FontParams {
                name: filename.trim_end_matches(".bin").to_string(),
                size: custom.size,
                bpp: custom.bpp,
                symbols: self.font_symbols(filename, custom)?,
                range: custom.range.clone().filter(|r| !r.is_empty()),
            };

            let converter: Arc<dyn FontConvert> = match &self.font_converter {
                Some(converter) => Arc::clone(converter),
                None => Arc::new(
                    LvFontConvCommand::locate().map_err(|e| BuildError::conversion(filename, e))?,
                ),
            };
            let converted = converter
                .convert(&font, &params)
                .map_err(|e| BuildError::conversion(filename, e))?;
            info!("Converted {} ({} bytes)", filename, converted.len());
            Ok(converted)
        })?;
        Ok(())
    }

    /// Charset text followed by the configured extra symbols.
    fn font_symbols(&self, filename: &str, custom: &CustomFontConfig) -> Result<String, BuildError> {
        let charset = match custom.charset.as_deref().filter(|c| !c.is_empty()) {
            Some(charset) => Some(charset),
            None if !custom.has_character_selection() => Some(DEFAULT_CHARSET),
            None => None,
        };

        let mut symbols = String::new();
        if let Some(charset) = charset {
            match charset_path(charset) {
                Some(path) => {
                    let text = self
                        .fetcher
                        .fetch(path)
                        .map_err(|e| BuildError::fetch(filename, e))?;
                    symbols.push_str(String::from_utf8_lossy(&text).trim_end_matches(['\r', '\n']));
                }
                None => warn!("Unknown charset '{}' ignored", charset),
            }
        }
        if let Some(extra) = &custom.symbols {
            symbols.push_str(extra);
        }
        Ok(symbols)
    }

    fn pack_models(&self, filename: &str, model: &str) -> Result<Vec<u8>, BuildError> {
        let mut models = ModelSetEncoder::new();
        for member in MODEL_MEMBER_FILES {
            let data = self
                .fetcher
                .fetch(&model_file_path(model, member))
                .map_err(|e| BuildError::fetch(filename, e))?;
            models.add_member_file(model, *member, data);
        }
        pack_model_set(filename, &models)
    }
}

fn pack_model_set(filename: &str, models: &ModelSetEncoder) -> Result<Vec<u8>, BuildError> {
    models.pack().map_err(|e| BuildError::conversion(filename, e))
}

fn read_user_file(filename: &str, path: &Path, max_bytes: u64) -> Result<Vec<u8>, BuildError> {
    read_file_with_limit(path, max_bytes).map_err(|source| {
        BuildError::fetch(
            filename,
            FetchError::Io {
                path: path.to_path_buf(),
                source,
            },
        )
    })
}

/// Read a custom emoji, shrinking it when it exceeds `target`.
///
/// Scaling failures fall back to the original bytes.
fn custom_emoji(
    scaler: &dyn ImageScale,
    resource: &PlannedResource,
    file: &Path,
    target: ImageSize,
) -> Result<Vec<u8>, BuildError> {
    let data = read_user_file(&resource.filename, file, MAX_IMAGE_BYTES)?;
    let extension = lowercase_extension(file).unwrap_or_else(|| "png".to_string());

    let (width, height) = match image_dimensions(&data) {
        Ok(size) => size,
        Err(e) => {
            warn!("Cannot read size of {}, packing as is: {}", resource.filename, e);
            return Ok(data);
        }
    };
    if width <= target.width && height <= target.height {
        return Ok(data);
    }

    info!(
        "Scaling {}: {}x{} -> {}x{}",
        resource.filename, width, height, target.width, target.height
    );
    match scaler.scale(&data, &extension, target) {
        Ok(scaled) => Ok(scaled),
        Err(e) => {
            warn!("Scaling {} failed, using original image: {}", resource.filename, e);
            Ok(data)
        }
    }
}

/// Every file the manifest names must be one of the materialized resources.
pub fn check_manifest(
    manifest: &IndexManifest,
    resources: &[LogicalResource],
) -> Result<(), PackagingError> {
    for filename in manifest.referenced_files() {
        if !resources.iter().any(|r| r.filename == filename) {
            return Err(PackagingError::ManifestMismatch {
                filename: filename.to_string(),
            });
        }
    }
    Ok(())
}

/// Encode `index.json` and the resources into package bytes.
pub fn encode(
    manifest: &IndexManifest,
    resources: Vec<LogicalResource>,
    progress: &mut dyn FnMut(f32, &str),
) -> Result<Vec<u8>, BuildError> {
    let index = manifest
        .to_json_bytes()
        .map_err(|e| BuildError::conversion(PACKAGE_FORMAT.manifest_name, e))?;

    let mut encoder = PackageEncoder::new();
    encoder.add_file(PACKAGE_FORMAT.manifest_name, index, None);
    for resource in resources {
        encoder.add_file(resource.filename, resource.data, resource.dimensions);
    }
    debug!("Package stats: {:?}", encoder.stats());

    Ok(encoder.generate_with_progress(progress)?)
}
