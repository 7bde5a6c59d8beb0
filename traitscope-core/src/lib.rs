// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Traitscope Core
//!
//! Profile tree model and the pure transformations built on it:
//!
//! - [`flatten`] turns a profile tree into a display-annotated outline
//! - [`chart`] locates a trait subtree and turns its children into chart slices
//!
//! Nothing in this crate performs I/O. Callers hand in a fully parsed and
//! validated [`ProfileDocument`] and get plain values back.

pub mod chart;
pub mod flatten;
pub mod format;
pub mod policy;
pub mod profile;
pub mod session;

pub use chart::{chart_data, locate, ChartData, ChartOptions, ChartSlice, ChartStyle, PaletteEntry};
pub use flatten::{flatten, preorder, DisplayItem, FlattenContext};
pub use format::{format_percentage, format_ratio};
pub use policy::{DisplayPolicy, TierPolicy, DEFAULT_CHARTABLE_IDS};
pub use profile::{ProfileDocument, ProfileError, ProfileNode};
pub use session::{SessionId, SessionIdError, MAX_SESSION_ID_LEN};
