pub use crate::efficiency::Efficiency;
pub use crate::model::ParametricModel;
pub use crate::pdfs::{DensityShape, NormalizationConfig};
