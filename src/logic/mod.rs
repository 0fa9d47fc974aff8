pub mod distance;
pub mod engine;
pub mod normalize;
pub mod scanning;

pub use distance::DistanceMetric;
pub use engine::CropRecommender;
pub use scanning::ScanService;
