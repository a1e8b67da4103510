//! Block catalog: schema and generator for every supported block.
//!
//! `stock` holds the handful of editor built-ins the rover blocks plug into
//! (literals, comparisons, variables, `if`/`while`). The remaining modules are
//! the rover accessory board, one per hardware group.

pub mod ir;
pub mod led;
pub mod line;
pub mod motion;
pub mod servo;
pub mod stock;
pub mod ultrasonic;

use crate::generator::BlockContext;
use crate::registry::BlockDefinition;

pub const ROVER_COLOUR: &str = "#cb2026";

const IMAGE_BASE: &str = "https://ohstem-public.s3.ap-southeast-1.amazonaws.com/extensions/AITT-VN/yolobit_extension_rover_advanced/images/";

pub(crate) fn image_url(file: &str) -> String {
    format!("{}{}", IMAGE_BASE, file)
}

pub(crate) fn import_rover(ctx: &mut BlockContext<'_, '_>) {
    ctx.define("import_rover", "from rover import *");
}

pub fn rover_definitions() -> Vec<BlockDefinition> {
    let mut definitions = motion::definitions();
    definitions.extend(servo::definitions());
    definitions.extend(led::definitions());
    definitions.extend(ultrasonic::definitions());
    definitions.extend(ir::definitions());
    definitions.extend(line::definitions());
    definitions
}
