// Pipeline orchestration: data source -> corpus -> similarity index.

pub mod prepare;
