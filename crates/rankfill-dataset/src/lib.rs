//! Brand-ranking dataset backfill
//! Loads the product timelines, synthesizes missing days from a base day and
//! inspects merged brand entries

pub mod error;
pub mod inspect;
pub mod io;
pub mod model;
pub mod plan;
pub mod synthesis;
pub mod timeline;

pub use error::{DatasetError, Result};
pub use inspect::{default_groups, inspect_product, BrandGroup, InspectionReport};
pub use io::{load_dataset, load_plan, save_dataset};
pub use model::{Dataset, DayRecord, Product, TimelineEntry};
pub use plan::{FieldPolicy, MetricPlan, SynthesisPlan};
pub use synthesis::synthesize_day;
pub use timeline::{backfill_dataset, backfill_product, date_range, select_base, BackfillRequest, BackfillSummary};
