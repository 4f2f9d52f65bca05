// Core traits and types shared by every environment in the crate.

/// A small ordered info map returned alongside every step.
/// Keys are unique; inserting an existing key replaces its value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Info {
    entries: Vec<(String, InfoValue)>,
}

impl Info {
    /// Create an empty Info map.
    pub fn new() -> Self { Self { entries: Vec::new() } }

    /// Insert or replace a key with the given value.
    pub fn insert<K: Into<String>, V: Into<InfoValue>>(&mut self, key: K, value: V) {
        let k = key.into();
        let value = value.into();
        if let Some((_, v)) = self.entries.iter_mut().find(|(kk, _)| kk == &k) {
            *v = value;
        } else {
            self.entries.push((k, value));
        }
    }

    /// Get a reference to a value by key.
    pub fn get(&self, key: &str) -> Option<&InfoValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Integer value stored under `key`, if present and integral.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.get(key) {
            Some(InfoValue::I64(v)) => Some(*v),
            _ => None,
        }
    }

    /// Boolean value stored under `key`, if present and boolean.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key) {
            Some(InfoValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn len(&self) -> usize { self.entries.len() }
}

/// Value types that can live in an [`Info`] map.
#[derive(Clone, Debug, PartialEq)]
pub enum InfoValue {
    Bool(bool),
    I64(i64),
    F64(f64),
    Str(String),
}

impl From<bool> for InfoValue { fn from(v: bool) -> Self { InfoValue::Bool(v) } }
impl From<i64> for InfoValue { fn from(v: i64) -> Self { InfoValue::I64(v) } }
impl From<i32> for InfoValue { fn from(v: i32) -> Self { InfoValue::I64(v as i64) } }
impl From<usize> for InfoValue { fn from(v: usize) -> Self { InfoValue::I64(v as i64) } }
impl From<f64> for InfoValue { fn from(v: f64) -> Self { InfoValue::F64(v) } }
impl From<&str> for InfoValue { fn from(v: &str) -> Self { InfoValue::Str(v.to_string()) } }
impl From<String> for InfoValue { fn from(v: String) -> Self { InfoValue::Str(v) } }

/// One transition as seen by the caller: `(observation, reward, done, info)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Step<Obs> {
    pub observation: Obs,
    pub reward: f64,
    pub done: bool,
    pub info: Info,
}

impl<Obs> Step<Obs> {
    pub fn new(observation: Obs, reward: f64, done: bool, info: Info) -> Self {
        Self { observation, reward, done, info }
    }

    /// Map the observation while keeping reward, done flag and info.
    pub fn map_observation<O2, F: FnOnce(Obs) -> O2>(self, f: F) -> Step<O2> {
        Step::new(f(self.observation), self.reward, self.done, self.info)
    }
}

/// Errors raised by environments, wrappers and the registry.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EnvError {
    #[error("Need to call reset() before first step()")]
    ResetNeeded,
    #[error("{what} index {index} out of bounds for size {len}")]
    OutOfBounds { what: &'static str, index: usize, len: usize },
    #[error("Invalid probability distribution: {0}")]
    InvalidDistribution(String),
    #[error("Invalid shape: {0}")]
    InvalidShape(String),
    #[error("Invalid action: {0}")]
    InvalidAction(String),
    #[error("Registry error: {0}")]
    Registry(String),
}

/// Convenience alias for results using EnvError.
pub type Result<T> = std::result::Result<T, EnvError>;

/// Environment contract: seed, reset, then step until done.
pub trait Env {
    type Obs;
    type Act;

    /// (Re)seed the environment's random source. With `None` a fresh seed is drawn.
    /// Returns the seed actually used as a single-element vector.
    fn seed(&mut self, seed: Option<u64>) -> Vec<u64>;

    /// Start a new episode and return its first observation.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Apply an action and advance the environment by one step.
    fn step(&mut self, action: Self::Act) -> Result<Step<Self::Obs>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_insert_replaces_existing_key() {
        let mut info = Info::new();
        info.insert("old_state", 3usize);
        info.insert("absorbing", true);
        info.insert("old_state", 4usize);
        assert_eq!(info.len(), 2);
        assert_eq!(info.get_i64("old_state"), Some(4));
        assert_eq!(info.get_bool("absorbing"), Some(true));
        assert_eq!(info.get_bool("old_state"), None);
        assert!(info.get("missing").is_none());
    }

    #[test]
    fn reset_needed_message() {
        assert_eq!(EnvError::ResetNeeded.to_string(), "Need to call reset() before first step()");
        let e = EnvError::OutOfBounds { what: "action", index: 5, len: 2 };
        assert_eq!(e.to_string(), "action index 5 out of bounds for size 2");
    }
}
