//! vfstatic core: turn a variable font plus a JSON configuration into named
//! static instances.
//!
//! The extractor ([`extract`]) writes a starting configuration for a font.
//! The batch driver ([`batch`]) loads a configuration, resolves every
//! variant's coordinate ([`resolve`]) and writes one static font per variant
//! ([`generate`]).

pub mod axis;
pub mod batch;
pub mod config;
pub mod error;
pub mod extract;
pub mod font;
pub mod generate;
pub mod io;
pub mod resolve;

pub use axis::{AxisTag, EffectiveCoordinate, FontAxis, FontDefaults, font_defaults};
pub use batch::{BatchOptions, BatchReport, BatchStatus, VariantOutcome, generate_from_config, run_batch};
pub use config::{AxisOverrides, ConfigWarning, Configuration, GlobalAxes, GlobalAxisValue, Variants};
pub use error::{Error, VariantError};
pub use extract::{ExtractOptions, dump_config, extract_config};
pub use font::SourceFont;
pub use generate::{build_instance, generate, output_file_name};
pub use resolve::resolve;
