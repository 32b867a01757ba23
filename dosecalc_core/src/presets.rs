//! Quick-pick values offered alongside free entry.

use crate::types::SyringeSize;

pub const VIAL_SIZES_MG: [f64; 4] = [5.0, 10.0, 15.0, 20.0];
pub const WATER_VOLUMES_ML: [f64; 3] = [1.0, 2.0, 3.0];
pub const DOSES_MCG: [f64; 4] = [100.0, 250.0, 500.0, 1000.0];
pub const SYRINGES: [SyringeSize; 3] = SyringeSize::ALL;
