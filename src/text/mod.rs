// Text handling: tokenization and question segmentation.

pub mod normalize;
pub mod segment;
