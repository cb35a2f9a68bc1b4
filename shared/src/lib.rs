pub mod auth;
pub mod detail;
pub mod distribution;
pub mod lookup;
pub mod normalize;
pub mod reference;
pub mod region_map;

pub use auth::*;
pub use detail::{DetailView, TooltipView, resolve_detail, tooltip_view};
pub use distribution::{DistributionBar, parse_distribution};
pub use lookup::{LanguageSection, phrase_sections, resource_sections};
pub use normalize::{normalize_key, province_key, split_list};
pub use reference::*;
pub use region_map::*;
