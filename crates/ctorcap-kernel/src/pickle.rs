//! JSON pickling over the get-state / set-state protocol.

use crate::error::SerializableError;
use crate::serializable::Serializable;
use crate::state::ReconstructionState;

/// Encode `instance` as its reconstruction state.
pub fn dumps<T: Serializable>(instance: &T) -> Result<String, SerializableError> {
    Ok(serde_json::to_string(&instance.get_state()?)?)
}

/// Decode a payload produced by [`dumps`] into a fresh instance.
pub fn loads<T: Serializable>(payload: &str) -> Result<T, SerializableError> {
    let state: ReconstructionState = serde_json::from_str(payload)?;
    T::from_state(state)
}

/// Decode a payload into an existing, initialised instance.
pub fn restore_into<T: Serializable>(target: &mut T, payload: &str) -> Result<(), SerializableError> {
    let state: ReconstructionState = serde_json::from_str(payload)?;
    target.set_state(state)
}
