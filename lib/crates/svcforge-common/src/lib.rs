//! Shared data model for svcforge: compiled service templates and the
//! label vocabulary recipes are written against.

pub mod labels;
pub mod template;

pub use template::{
    Argument, DEFAULT_HOOK_IMAGE, IMAGE_ARGUMENT, SECRET_SUFFIX, ServiceHooks, ServiceImage, ServicePorts,
    ServiceTemplate, Volume,
};
