use crate::config::SyncConfig;
use crate::pipeline::defaults::{MarkerReferenceResolver, SchemaReshaper, ShiftProjector};
use crate::pipeline::runtime::{EventAligner, EventAlignerParts};
use crate::pipeline::traits::{LogReshaper, ReferenceResolver, TimelineProjector};

pub struct EventAlignerBuilder {
    config: SyncConfig,
    reshaper: Option<Box<dyn LogReshaper>>,
    resolver: Option<Box<dyn ReferenceResolver>>,
    projector: Option<Box<dyn TimelineProjector>>,
}

impl EventAlignerBuilder {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            reshaper: None,
            resolver: None,
            projector: None,
        }
    }

    pub fn with_reshaper(mut self, reshaper: Box<dyn LogReshaper>) -> Self {
        self.reshaper = Some(reshaper);
        self
    }

    pub fn with_resolver(mut self, resolver: Box<dyn ReferenceResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn with_projector(mut self, projector: Box<dyn TimelineProjector>) -> Self {
        self.projector = Some(projector);
        self
    }

    pub fn build(self) -> EventAligner {
        EventAligner::from_parts(EventAlignerParts {
            config: self.config,
            reshaper: self.reshaper.unwrap_or_else(|| Box::new(SchemaReshaper)),
            resolver: self
                .resolver
                .unwrap_or_else(|| Box::new(MarkerReferenceResolver)),
            projector: self.projector.unwrap_or_else(|| Box::new(ShiftProjector)),
        })
    }
}
