use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};

use crate::{
    Config, Engine, Result, StoreType,
    generate::{Generator, HttpGenerator},
    store::{MemStore, WorkflowStore},
};

pub struct EngineBuilder {
    config: Config,
    store: Option<Arc<dyn WorkflowStore>>,
    generator: Option<Arc<dyn Generator>>,
    rt: Option<Arc<Runtime>>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            config: Config::default(),
            store: None,
            generator: None,
            rt: None,
        }
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(
        mut self,
        config: Config,
    ) -> Self {
        self.config = config;
        self
    }

    pub fn async_worker_thread_number(
        mut self,
        n: u16,
    ) -> Self {
        self.config.async_worker_thread_number = n;
        self
    }

    /// Override the workflow store. Without this the store type from the
    /// config is used.
    pub fn store(
        mut self,
        store: Arc<dyn WorkflowStore>,
    ) -> Self {
        self.store = Some(store);
        self
    }

    /// Override the generation backend. Without this an HTTP client is
    /// built from the config's `[generator]` section.
    pub fn generator(
        mut self,
        generator: Arc<dyn Generator>,
    ) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn runtime(
        mut self,
        runtime: Arc<Runtime>,
    ) -> Self {
        self.rt = Some(runtime);
        self
    }

    pub fn build(&self) -> Result<Engine> {
        let runtime = if self.rt.is_some() {
            self.rt.as_ref().unwrap().clone()
        } else {
            Arc::new(Builder::new_multi_thread().worker_threads(self.config.async_worker_thread_number.into()).enable_all().build().unwrap())
        };

        let store: Arc<dyn WorkflowStore> = match &self.store {
            Some(store) => store.clone(),
            None => match self.config.store.store_type {
                StoreType::Mem => Arc::new(MemStore::new()),
            },
        };

        let generator: Arc<dyn Generator> = match &self.generator {
            Some(generator) => generator.clone(),
            None => Arc::new(HttpGenerator::new(
                &self.config.generator.endpoint,
                &self.config.generator.model,
                self.config.generator.api_key.clone(),
            )),
        };

        let engine = Engine::new(store, generator, runtime);

        Ok(engine)
    }
}
