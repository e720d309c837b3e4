pub mod duplicates;
pub mod merge_plan;
pub mod normalize;
pub mod similarity;
