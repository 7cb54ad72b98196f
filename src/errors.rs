// This file is part of the ecgen package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Errors returned by ecgen.

use thiserror::Error;
use uucore::error::UError;

#[derive(Debug, Error)]
pub enum EcgenError {
    /// A mode the command line accepts but ecgen does not implement.
    #[error("{0} is not implemented")]
    Unimplemented(&'static str),

    /// Creating a worker thread failed; the search cannot run degraded.
    #[error("failed to spawn worker thread: {0}")]
    ThreadSpawn(std::io::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl UError for EcgenError {
    fn code(&self) -> i32 {
        1
    }
}
