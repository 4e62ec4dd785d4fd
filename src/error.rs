/*
 *  error.rs
 *
 *  vkdyn - Vulkan dynamic loading shim
 *  (c) 2020-26 Stuart Hunter
 *
 *  Error taxonomy for loader and dispatch construction
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use ash::vk;
use thiserror::Error;

/// Hard failures of loader creation and dispatch table construction.
///
/// A symbol that simply is not exported (an unsupported extension, an older
/// driver) is not an error at all; the matching table field stays `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoaderError {
    /// A required input was null, or an internal structure could not be set up.
    #[error("out of host memory: {0}")]
    OutOfHostMemory(String),

    /// The driver library could not be opened, or a tier's bootstrap
    /// resolver could not be found.
    #[error("incompatible driver: {0}")]
    IncompatibleDriver(String),
}

impl LoaderError {
    /// The Vulkan result code this failure corresponds to
    pub fn vk_result(&self) -> vk::Result {
        match self {
            LoaderError::OutOfHostMemory(_) => vk::Result::ERROR_OUT_OF_HOST_MEMORY,
            LoaderError::IncompatibleDriver(_) => vk::Result::ERROR_INCOMPATIBLE_DRIVER,
        }
    }

    pub fn is_incompatible_driver(&self) -> bool {
        matches!(self, LoaderError::IncompatibleDriver(_))
    }
}

impl From<LoaderError> for vk::Result {
    fn from(err: LoaderError) -> Self {
        err.vk_result()
    }
}

/// Collapse a construction result into the raw result code
pub fn result_code<T>(result: &Result<T, LoaderError>) -> vk::Result {
    match result {
        Ok(_) => vk::Result::SUCCESS,
        Err(err) => err.vk_result(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vk_result_mapping() {
        let oom = LoaderError::OutOfHostMemory("null loader".into());
        let bad = LoaderError::IncompatibleDriver("no vkGetInstanceProcAddr".into());

        assert_eq!(oom.vk_result(), vk::Result::ERROR_OUT_OF_HOST_MEMORY);
        assert_eq!(bad.vk_result(), vk::Result::ERROR_INCOMPATIBLE_DRIVER);
        assert!(bad.is_incompatible_driver());
        assert!(!oom.is_incompatible_driver());
    }

    #[test]
    fn test_result_code() {
        let ok: Result<(), LoaderError> = Ok(());
        let err: Result<(), LoaderError> = Err(LoaderError::IncompatibleDriver("x".into()));

        assert_eq!(result_code(&ok), vk::Result::SUCCESS);
        assert_eq!(result_code(&err), vk::Result::ERROR_INCOMPATIBLE_DRIVER);
        assert_eq!(vk::Result::from(LoaderError::OutOfHostMemory("y".into())),
            vk::Result::ERROR_OUT_OF_HOST_MEMORY);
    }

    #[test]
    fn test_display_carries_detail() {
        let err = LoaderError::IncompatibleDriver("libvulkan.so not found".into());
        assert_eq!(err.to_string(), "incompatible driver: libvulkan.so not found");
    }
}
