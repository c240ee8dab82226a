pub mod annotation;

pub use annotation::{Annotation, AnnotationSet};
