//! Cached marker image construction.
//!
//! [`MarkerBuilder`] is the renderer's public entry point: it ties layout,
//! interpolation and rasterization together and memoizes finished images in
//! a [`RasterCache`].

use std::sync::Arc;
use tracing::{debug, warn};

use crate::element::ElementTree;
use crate::icon::{IconRenderer, SvgIconRenderer};
use crate::interpolate::Interpolator;
use crate::layout::LayoutEngine;
use crate::raster::{RasterImage, Rasterizer};
use crate::typeface::Typeface;
use marker_common::{MarkerConfig, MarkerResult, MarkerSpec};
use storage::{CacheKey, RasterCache};

/// Builds steady-state marker images and transition frames.
pub struct MarkerBuilder {
    layout: LayoutEngine,
    rasterizer: Rasterizer,
    interpolator: Interpolator,
    cache: RasterCache<RasterImage>,
}

impl MarkerBuilder {
    pub fn new(
        config: &MarkerConfig,
        density: f32,
        typeface: Arc<Typeface>,
        icons: Box<dyn IconRenderer>,
    ) -> Self {
        let layout = LayoutEngine::new(config, density, typeface.clone(), icons);
        let rasterizer = Rasterizer::new(typeface.clone(), layout.metrics());
        Self {
            layout,
            rasterizer,
            interpolator: Interpolator::new(typeface),
            cache: RasterCache::from_config(&config.cache),
        }
    }

    /// Builder with the configured font (if any) and the SVG icon renderer.
    pub fn from_config(config: &MarkerConfig, density: f32) -> MarkerResult<Self> {
        let typeface = match &config.font_path {
            Some(path) => Typeface::from_file(path)?,
            None => {
                warn!("No font_path configured; using estimated text metrics");
                Typeface::estimated()
            }
        };
        Ok(Self::new(
            config,
            density,
            Arc::new(typeface),
            Box::new(SvgIconRenderer::default()),
        ))
    }

    pub fn layout_engine(&self) -> &LayoutEngine {
        &self.layout
    }

    pub fn layout(&self, spec: &MarkerSpec) -> ElementTree {
        self.layout.layout(spec)
    }

    /// Element tree for one point of a transition.
    pub fn transition_tree(&self, start: &MarkerSpec, end: &MarkerSpec, step: f32) -> ElementTree {
        let from = self.layout.layout(start);
        let to = self.layout.layout(end);
        self.interpolator.interpolate(&from, &to, step)
    }

    /// Steady-state image for `spec`.
    pub fn build(&mut self, spec: &MarkerSpec) -> MarkerResult<RasterImage> {
        let key = CacheKey::marker(spec);
        if let Some(image) = self.cache.get(&key) {
            return Ok(image);
        }

        let image = self.rasterizer.rasterize(&self.layout.layout(spec))?;
        debug!(label = %spec.label, width = image.width(), height = image.height(), "Built marker");
        self.cache.put(key, image.clone());
        Ok(image)
    }

    /// One interpolated frame between `start` and `end`.
    pub fn build_transition_frame(
        &mut self,
        start: &MarkerSpec,
        end: &MarkerSpec,
        step: f32,
    ) -> MarkerResult<RasterImage> {
        let mut frames = self.build_transition_frames(start, end, &[step])?;
        Ok(frames.remove(0))
    }

    /// Frames for each of `steps`, laying out both endpoints once.
    pub fn build_transition_frames(
        &mut self,
        start: &MarkerSpec,
        end: &MarkerSpec,
        steps: &[f32],
    ) -> MarkerResult<Vec<RasterImage>> {
        let mut trees: Option<(ElementTree, ElementTree)> = None;
        let mut frames = Vec::with_capacity(steps.len());

        for &step in steps {
            let key = CacheKey::frame(start, end, step);
            if let Some(image) = self.cache.get(&key) {
                frames.push(image);
                continue;
            }

            let (from, to) =
                trees.get_or_insert_with(|| (self.layout.layout(start), self.layout.layout(end)));
            let tree = self.interpolator.interpolate(from, to, step);
            let image = self.rasterizer.rasterize(&tree)?;
            self.cache.put(key, image.clone());
            frames.push(image);
        }

        Ok(frames)
    }

    pub fn cache(&self) -> &RasterCache<RasterImage> {
        &self.cache
    }

    /// Disabling drops every cached image; builds then always recompute.
    pub fn set_cache_enabled(&mut self, enabled: bool) {
        self.cache.set_enabled(enabled);
    }
}
