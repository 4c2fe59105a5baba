//! Per-landscape orchestration
//!
//! `Pipeline::run` processes every landscape independently on the rayon pool.
//! Within a landscape, fire layers are prepared in parallel, ranked by
//! recency, folded into four trait surfaces, quantized and aggregated.
//!
//! Only configuration problems abort a run. Everything else (a misaligned or
//! unreadable record, a landscape without fires, a bad mask, a one-class
//! community) is logged and recorded as a [`Diagnostic`] on the landscape's
//! report.

use crate::config::PyroConfig;
use crate::core_types::TraitMap;
use crate::diversity::{aggregate, PyrodiversityResult, Quantizer};
use crate::error::{AlignmentError, ConfigError, PyroError, SourceError};
use crate::grid::{GridSpec, Raster, RasterRef, RasterStore};
use crate::history::{FireHistory, FireRecord, Landscape, LandscapeWindow};
use crate::mosaic::{recency_ranks, DecayRate, FireLayer, SurfaceBuilder, TraitSurface};
use crate::output::{write_surfaces, SurfaceSink};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::fmt;
use tracing::{debug, info, warn};

/// A recoverable problem met while processing one landscape
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// Severity raster not on the common grid; record skipped
    RecordMisaligned {
        landscape_id: String,
        record_id: String,
        error: AlignmentError,
    },
    /// Severity raster could not be opened; record dropped
    RecordUnreadable {
        landscape_id: String,
        record_id: String,
        error: SourceError,
    },
    /// No fire in the window reached the landscape
    NoFires { landscape_id: String },
    /// Flammability mask not on the common grid; mask ignored
    MaskMisaligned {
        landscape_id: String,
        error: AlignmentError,
    },
    /// Flammability mask could not be opened; mask ignored
    MaskUnreadable {
        landscape_id: String,
        error: SourceError,
    },
    /// Only one trait class; dispersion is 0
    DegenerateCommunity { landscape_id: String },
    /// Quantized surfaces and mask disagreed on the grid; result undefined
    SurfacesMisaligned {
        landscape_id: String,
        error: AlignmentError,
    },
}

impl Diagnostic {
    /// Landscape the diagnostic belongs to
    pub fn landscape_id(&self) -> &str {
        match self {
            Diagnostic::RecordMisaligned { landscape_id, .. }
            | Diagnostic::RecordUnreadable { landscape_id, .. }
            | Diagnostic::NoFires { landscape_id }
            | Diagnostic::MaskMisaligned { landscape_id, .. }
            | Diagnostic::MaskUnreadable { landscape_id, .. }
            | Diagnostic::DegenerateCommunity { landscape_id }
            | Diagnostic::SurfacesMisaligned { landscape_id, .. } => landscape_id,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::RecordMisaligned {
                landscape_id,
                record_id,
                error,
            } => write!(
                f,
                "landscape {landscape_id}: fire {record_id} skipped, misaligned: {error}"
            ),
            Diagnostic::RecordUnreadable {
                landscape_id,
                record_id,
                error,
            } => write!(
                f,
                "landscape {landscape_id}: fire {record_id} dropped, unreadable: {error}"
            ),
            Diagnostic::NoFires { landscape_id } => {
                write!(f, "landscape {landscape_id}: no fires in the year window")
            }
            Diagnostic::MaskMisaligned {
                landscape_id,
                error,
            } => write!(
                f,
                "landscape {landscape_id}: flammability mask ignored, misaligned: {error}"
            ),
            Diagnostic::MaskUnreadable {
                landscape_id,
                error,
            } => write!(
                f,
                "landscape {landscape_id}: flammability mask ignored, unreadable: {error}"
            ),
            Diagnostic::DegenerateCommunity { landscape_id } => write!(
                f,
                "landscape {landscape_id}: single trait class, dispersion is 0"
            ),
            Diagnostic::SurfacesMisaligned {
                landscape_id,
                error,
            } => write!(
                f,
                "landscape {landscape_id}: surfaces not co-registered, result undefined: {error}"
            ),
        }
    }
}

/// Everything produced for one landscape
#[derive(Debug, Clone)]
pub struct LandscapeReport {
    pub result: PyrodiversityResult,
    /// Trait surfaces before quantization
    pub surfaces: TraitMap<TraitSurface>,
    /// Trait surfaces after quantization
    pub quantized: TraitMap<TraitSurface>,
    pub diagnostics: Vec<Diagnostic>,
}

/// A validated configuration ready to process landscapes
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PyroConfig,
    decay: DecayRate,
    quantizer: Quantizer,
}

impl Pipeline {
    /// Validate `config`
    ///
    /// # Errors
    /// Returns the first `ConfigError` found by [`PyroConfig::validate`].
    pub fn new(config: PyroConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let decay = config.decay()?;
        let quantizer = Quantizer::from_config(&config)?;
        Ok(Pipeline {
            config,
            decay,
            quantizer,
        })
    }

    pub fn config(&self) -> &PyroConfig {
        &self.config
    }

    /// Process every landscape, one report per landscape in input order
    ///
    /// # Errors
    /// Returns `ConfigError::MissingIdField` if a landscape lacks the
    /// identifier attribute, or `ConfigError::DuplicateLandscapeId` if two
    /// landscapes share one. No landscape is processed in either case.
    pub fn run(
        &self,
        history: &FireHistory,
        landscapes: &[Landscape],
        store: Option<&dyn RasterStore>,
    ) -> Result<Vec<LandscapeReport>, ConfigError> {
        let ids = self.landscape_ids(landscapes)?;

        info!(
            "Processing {} landscapes against {} fire records ({}-{}, r = {})",
            landscapes.len(),
            history.records().len(),
            self.config.start_year,
            self.config.end_year,
            self.decay.get()
        );

        let reports: Vec<LandscapeReport> = landscapes
            .par_iter()
            .zip(ids.par_iter())
            .map(|(landscape, id)| self.process_landscape(id, landscape, history, store))
            .collect();

        let defined = reports.iter().filter(|r| r.result.is_defined()).count();
        let diagnostics: usize = reports.iter().map(|r| r.diagnostics.len()).sum();
        info!(
            "Finished {} landscapes: {} defined, {} diagnostics",
            reports.len(),
            defined,
            diagnostics
        );

        Ok(reports)
    }

    /// Run and write every landscape's raw trait surfaces to `sink`
    ///
    /// # Errors
    /// Returns `PyroError::Config` as [`Pipeline::run`], or `PyroError::Sink`
    /// for the first surface that fails to write.
    pub fn run_with_sink(
        &self,
        history: &FireHistory,
        landscapes: &[Landscape],
        store: Option<&dyn RasterStore>,
        sink: &dyn SurfaceSink,
    ) -> Result<Vec<LandscapeReport>, PyroError> {
        let reports = self.run(history, landscapes, store)?;
        for report in &reports {
            write_surfaces(sink, &self.config.output.prefixes, &report.surfaces)?;
        }
        Ok(reports)
    }

    fn landscape_ids<'a>(
        &self,
        landscapes: &'a [Landscape],
    ) -> Result<Vec<&'a str>, ConfigError> {
        let mut seen = FxHashSet::default();
        let mut ids = Vec::with_capacity(landscapes.len());
        for (index, landscape) in landscapes.iter().enumerate() {
            let id = landscape.require_id(&self.config.id_field, index)?;
            if !seen.insert(id) {
                return Err(ConfigError::DuplicateLandscapeId(id.to_string()));
            }
            ids.push(id);
        }
        Ok(ids)
    }

    fn process_landscape(
        &self,
        id: &str,
        landscape: &Landscape,
        history: &FireHistory,
        store: Option<&dyn RasterStore>,
    ) -> LandscapeReport {
        let region = history.grid();
        let window = LandscapeWindow::new(id, landscape, region);
        let mut diagnostics = Vec::new();

        let bbox = landscape.boundary.bbox();
        let candidates: Vec<&FireRecord> = match &bbox {
            Some(bbox) => history.candidates(bbox, &self.config).collect(),
            None => Vec::new(),
        };
        debug!(
            "Landscape {}: {} candidate fires over {}x{} cells",
            id,
            candidates.len(),
            window.grid.ncols,
            window.grid.nrows
        );

        let mut layers =
            self.prepare_layers(&candidates, &window, region, store, &mut diagnostics);

        let dates: Vec<_> = layers.iter().map(|l| (l.year, l.day_of_year)).collect();
        let ranks = recency_ranks(&dates, self.config.recency);
        for (layer, rank) in layers.iter_mut().zip(ranks) {
            layer.assign_rank(rank, self.decay);
        }

        if layers.is_empty() {
            warn!(
                "Landscape {}: no fires in {}-{}",
                id, self.config.start_year, self.config.end_year
            );
            diagnostics.push(Diagnostic::NoFires {
                landscape_id: id.to_string(),
            });
        }

        let surfaces = SurfaceBuilder::new(&window.grid, &layers).build_all(id);
        let quantized = self.quantizer.quantize_all(&surfaces);
        let mask = self.load_mask(&window, store, &mut diagnostics);

        let fire_count = layers.len();
        let result = match aggregate(&quantized, mask.as_ref()) {
            Ok(aggregation) => {
                if aggregation.metrics.is_some_and(|m| m.richness == 1) {
                    warn!("Landscape {}: single trait class, dispersion is 0", id);
                    diagnostics.push(Diagnostic::DegenerateCommunity {
                        landscape_id: id.to_string(),
                    });
                }
                PyrodiversityResult::from_aggregation(id, fire_count, &aggregation)
            }
            Err(error) => {
                warn!("Landscape {}: surfaces rejected by aggregator: {}", id, error);
                diagnostics.push(Diagnostic::SurfacesMisaligned {
                    landscape_id: id.to_string(),
                    error,
                });
                PyrodiversityResult::undefined(id, fire_count)
            }
        };

        match result.dispersion {
            Some(dispersion) => info!(
                "Landscape {}: FDis = {:.6}, {} classes over {} pixels from {} fires",
                id,
                dispersion,
                result.richness.unwrap_or_default(),
                result.valid_pixels,
                fire_count
            ),
            None => info!("Landscape {}: pyrodiversity undefined (no valid pixels)", id),
        }

        LandscapeReport {
            result,
            surfaces,
            quantized,
            diagnostics,
        }
    }

    fn prepare_layers(
        &self,
        candidates: &[&FireRecord],
        window: &LandscapeWindow,
        region: &GridSpec,
        store: Option<&dyn RasterStore>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<FireLayer> {
        let outcomes: Vec<_> = candidates
            .par_iter()
            .map(|record| {
                let outcome =
                    FireLayer::prepare(record, window, region, &self.config.patches, store);
                (record.id.as_str(), outcome)
            })
            .collect();

        let mut layers = Vec::with_capacity(outcomes.len());
        for (record_id, outcome) in outcomes {
            match outcome {
                Ok(Some(layer)) => layers.push(layer),
                Ok(None) => {}
                Err(SourceError::Alignment(error)) => {
                    warn!("Landscape {}: skipping fire {}: {}", window.id, record_id, error);
                    diagnostics.push(Diagnostic::RecordMisaligned {
                        landscape_id: window.id.clone(),
                        record_id: record_id.to_string(),
                        error,
                    });
                }
                Err(error) => {
                    warn!("Landscape {}: dropping fire {}: {}", window.id, record_id, error);
                    diagnostics.push(Diagnostic::RecordUnreadable {
                        landscape_id: window.id.clone(),
                        record_id: record_id.to_string(),
                        error,
                    });
                }
            }
        }
        layers
    }

    fn load_mask(
        &self,
        window: &LandscapeWindow,
        store: Option<&dyn RasterStore>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<Raster> {
        let path = self.config.flammability_masks.get(&window.id)?;
        let reference = RasterRef::External(path.clone());
        let outcome = reference
            .open(store)
            .and_then(|mask| mask.clip_to(&window.grid).map_err(SourceError::from));

        match outcome {
            Ok(mask) => {
                debug!(
                    "Landscape {}: flammability mask {} ({} flammable cells)",
                    window.id,
                    reference,
                    mask.values().iter().filter(|&&v| !v.is_nan() && v != 0.0).count()
                );
                Some(mask)
            }
            Err(SourceError::Alignment(error)) => {
                warn!("Landscape {}: ignoring mask {}: {}", window.id, reference, error);
                diagnostics.push(Diagnostic::MaskMisaligned {
                    landscape_id: window.id.clone(),
                    error,
                });
                None
            }
            Err(error) => {
                warn!("Landscape {}: ignoring mask {}: {}", window.id, reference, error);
                diagnostics.push(Diagnostic::MaskUnreadable {
                    landscape_id: window.id.clone(),
                    error,
                });
                None
            }
        }
    }
}
