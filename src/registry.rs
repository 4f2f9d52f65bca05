//! Global registry mapping string ids to environment constructors.
//!
//! `make` applies the spec's default step limit by wrapping the constructed
//! environment in [`TimeLimit`].

use std::any::Any;
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use log::debug;

use crate::core::{Env, EnvError, Result, Step};
use crate::wrappers::TimeLimit;

/// Key-value kwargs for make(). Stringly-typed values.
pub type KwArgs = HashMap<String, String>;

/// Environment specification metadata.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnvSpec {
    /// Unique identifier like "seals/RiskyPath-v0".
    pub id: String,
    /// Step limit applied by `make`; `None` leaves episodes unbounded.
    pub max_episode_steps: Option<u64>,
    /// Target reward threshold for a "solved" score, if defined.
    pub reward_threshold: Option<f64>,
    /// Whether environment has inherent nondeterminism beyond RNG seed.
    pub nondeterministic: bool,
    pub version: Option<String>,
}

impl EnvSpec {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self {
            id: id.into(),
            max_episode_steps: None,
            reward_threshold: None,
            nondeterministic: false,
            version: None,
        }
    }

    pub fn with_max_episode_steps(mut self, steps: u64) -> Self {
        self.max_episode_steps = Some(steps);
        self
    }
}

/// A type-erased environment, returned by [`make`].
pub trait EnvDyn {
    fn seed(&mut self, seed: Option<u64>) -> Vec<u64>;
    fn reset(&mut self) -> Result<Box<dyn Any>>;
    fn step(&mut self, action: Box<dyn Any>) -> Result<Step<Box<dyn Any>>>;
}

/// Adapts any Env into EnvDyn by boxing Obs/Act via Any.
struct DynEnv<E: Env>(E);

impl<E: Env> EnvDyn for DynEnv<E>
where
    E::Obs: Any + 'static,
    E::Act: Any + 'static,
{
    fn seed(&mut self, seed: Option<u64>) -> Vec<u64> { self.0.seed(seed) }

    fn reset(&mut self) -> Result<Box<dyn Any>> {
        let obs = self.0.reset()?;
        Ok(Box::new(obs))
    }

    fn step(&mut self, action: Box<dyn Any>) -> Result<Step<Box<dyn Any>>> {
        let action = action.downcast::<E::Act>().map_err(|_| {
            EnvError::InvalidAction(format!("expected action of type {}", std::any::type_name::<E::Act>()))
        })?;
        let s = self.0.step(*action)?;
        Ok(s.map_observation(|o| Box::new(o) as Box<dyn Any>))
    }
}

/// Boxed type-erased environment as handed out by the registry.
pub type BoxedEnv = Box<dyn EnvDyn + Send>;

/// Factory closure type for constructing environments with kwargs.
pub type FactoryFn = Box<dyn Fn(KwArgs) -> Result<BoxedEnv> + Send + Sync>;

#[derive(Default)]
struct RegistryInner {
    specs: HashMap<String, EnvSpec>,
    factories: HashMap<String, FactoryFn>,
}

struct Registry {
    inner: RwLock<RegistryInner>,
}

impl Registry {
    fn new() -> Self { Self { inner: RwLock::new(RegistryInner::default()) } }

    fn register(&self, spec: EnvSpec, factory: FactoryFn) -> Result<()> {
        let mut g = self.inner.write().map_err(|_| EnvError::Registry("registry poisoned".into()))?;
        if g.specs.contains_key(&spec.id) {
            return Err(EnvError::Registry(format!("Env id already registered: {}", spec.id)));
        }
        debug!("registering {} (max_episode_steps = {:?})", spec.id, spec.max_episode_steps);
        g.factories.insert(spec.id.clone(), factory);
        g.specs.insert(spec.id.clone(), spec);
        Ok(())
    }

    fn get_spec(&self, id: &str) -> Option<EnvSpec> {
        let g = self.inner.read().ok()?;
        g.specs.get(id).cloned()
    }

    fn make(&self, id: &str, kwargs: KwArgs) -> Result<BoxedEnv> {
        let guard = self.inner.read().map_err(|_| EnvError::Registry("registry poisoned".into()))?;
        match guard.factories.get(id) {
            Some(f) => {
                debug!("making {id}");
                (f)(kwargs)
            }
            None => Err(EnvError::Registry(format!("Unknown environment id: {}", id))),
        }
    }
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

/// Register `ctor` under `spec.id`. Environments made from it are wrapped in
/// [`TimeLimit`] when `spec.max_episode_steps` is set.
pub fn register<E, F>(spec: EnvSpec, ctor: F) -> Result<()>
where
    E: Env + Send + 'static,
    E::Obs: Any + 'static,
    E::Act: Any + 'static,
    F: Fn(KwArgs) -> Result<E> + Send + Sync + 'static,
{
    let max_steps = spec.max_episode_steps;
    let factory: FactoryFn = Box::new(move |kwargs: KwArgs| {
        let env = ctor(kwargs)?;
        Ok(match max_steps {
            Some(n) => Box::new(DynEnv(TimeLimit::new(env, n))) as BoxedEnv,
            None => Box::new(DynEnv(env)) as BoxedEnv,
        })
    });
    registry().register(spec, factory)
}

/// Fetch a registered EnvSpec by id.
pub fn get_spec(id: &str) -> Option<EnvSpec> { registry().get_spec(id) }

/// Construct an environment by id with kwargs, returning a boxed dynamic env.
pub fn make<S: AsRef<str>>(id: S, kwargs: KwArgs) -> Result<BoxedEnv> { registry().make(id.as_ref(), kwargs) }

/// Parse an optional kwarg, falling back to `default` when absent.
pub fn kwarg<T: std::str::FromStr>(kwargs: &KwArgs, key: &str, default: T) -> Result<T> {
    match kwargs.get(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| EnvError::Registry(format!("could not parse kwarg {key}={raw}"))),
        None => Ok(default),
    }
}
