pub mod pipeline_service;
pub mod storage_class_service;
