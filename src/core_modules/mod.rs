pub mod change_analyzer;
pub mod component_labeler;
pub mod difference_map;
pub mod intensity_image;
pub mod utils;
