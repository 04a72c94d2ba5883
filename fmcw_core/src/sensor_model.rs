// fmcw_core/src/sensor_model.rs

//! The sensor instance: owns the validated parameters, the strategies built
//! from them and the noise generator, and turns scene snapshots into
//! detections.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::{ModelParameters, SensorConfig, SensorParameters};
use crate::error::ConfigError;
use crate::logging::{category, LogSink, Logger};
use crate::messages::{SceneSnapshot, SensorOutput};
use crate::models::perception::assembler::{BeamCandidates, DetectionAssembler};
use crate::models::perception::beam_pattern::{beam_rays, sub_ray_offsets};
use crate::models::perception::noise::NoiseInjector;
use crate::models::perception::range_doppler::RangeDopplerProcessor;
use crate::models::perception::ray_caster::AnalyticRayCaster;
use crate::models::perception::spectrum::spectrum_estimator;
use crate::models::perception::{RayCaster, SpectrumEstimator};
use crate::types::Beam;

#[derive(Debug, Clone)]
pub struct SensorModel {
    model: ModelParameters,
    sensor: SensorParameters,
    logger: Logger,

    // --- Pipeline stages, built once from the parameters ---
    ray_offsets: Vec<(f64, f64)>,
    ray_caster: Box<dyn RayCaster>,
    spectrum: Box<dyn SpectrumEstimator>,
    processor: RangeDopplerProcessor,
    noise: NoiseInjector,
    assembler: DetectionAssembler,

    // --- Cross-step state ---
    rng: ChaCha8Rng,
    last_time: Option<f64>,
    parallel: bool,
}

impl SensorModel {
    /// Derives every parameter from the nominal range and builds the model.
    pub fn init(
        nominal_range: f64,
        instance_name: &str,
        sink: Arc<dyn LogSink>,
        logging_on: bool,
    ) -> Result<Self, ConfigError> {
        let logger = Logger::new(instance_name, sink, logging_on);
        Self::from_config(&SensorConfig::from_nominal_range(nominal_range), logger)
    }

    pub fn from_config(config: &SensorConfig, logger: Logger) -> Result<Self, ConfigError> {
        let model = ModelParameters::from_config(config).map_err(|e| report(&logger, e))?;
        let sensor = SensorParameters::from_config(config).map_err(|e| report(&logger, e))?;
        Self::new(model, sensor, config.seed, logger)
    }

    /// Builds the model from already derived parameter sets.
    ///
    /// Both sets are validated again here, so hand-edited parameters cannot
    /// reach a step with broken invariants. `seed = None` seeds from entropy.
    pub fn new(
        model: ModelParameters,
        sensor: SensorParameters,
        seed: Option<u64>,
        logger: Logger,
    ) -> Result<Self, ConfigError> {
        model.validate().map_err(|e| report(&logger, e))?;
        sensor.validate().map_err(|e| report(&logger, e))?;

        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        if logger.is_enabled(category::TRACE) {
            logger.log(
                category::TRACE,
                format!(
                    "{} beams x {} rays, {} bins of {:.4} m, spectrum {:?}",
                    model.beam_config.len(),
                    model.rays_per_beam(),
                    sensor.num_fft_bins,
                    sensor.range_per_bin(),
                    sensor.spectrum
                ),
            );
        }

        Ok(Self {
            ray_offsets: sub_ray_offsets(
                &model.beam_divergence,
                model.rays_per_beam_horizontal(),
                model.rays_per_beam_vertical(),
            ),
            ray_caster: Box::new(AnalyticRayCaster),
            spectrum: spectrum_estimator(&model, &sensor),
            processor: RangeDopplerProcessor::new(&model, &sensor),
            noise: NoiseInjector::new(model.distance_noise_std, model.velocity_noise_std),
            assembler: DetectionAssembler::new(&sensor),
            rng,
            last_time: None,
            parallel: cfg!(feature = "parallel"),
            model,
            sensor,
            logger,
        })
    }

    /// Replaces the geometric sampling strategy.
    pub fn with_ray_caster(mut self, ray_caster: Box<dyn RayCaster>) -> Self {
        self.ray_caster = ray_caster;
        self
    }

    /// Fans beams out over the thread pool. Only effective with the
    /// `parallel` feature; the output is the same either way.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn model_params(&self) -> &ModelParameters {
        &self.model
    }

    pub fn sensor_params(&self) -> &SensorParameters {
        &self.sensor
    }

    pub fn beams(&self) -> &[Beam] {
        &self.model.beam_config
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Produces the detections of one step. Never fails: degenerate scenes
    /// only change the shape of the output.
    pub fn step(&mut self, scene: &SceneSnapshot, elapsed_time: f64) -> SensorOutput {
        // 1. Time bookkeeping.
        if let Some(last) = self.last_time {
            if !(elapsed_time > last) {
                self.logger.log(
                    category::STEP,
                    format!("non-monotonic step time: {elapsed_time} s after {last} s"),
                );
            }
        }
        self.last_time = Some(elapsed_time);

        // 2. One draw from the model generator seeds every beam's stream.
        let step_seed: u64 = self.rng.gen();

        // 3. Per-beam pipeline, then assembly.
        let per_beam = self.run_beams(scene, step_seed);
        let detections = self.assembler.assemble(per_beam);

        self.logger.log(
            category::STEP,
            format!(
                "t={elapsed_time:.3} s: {} objects, {} detections",
                scene.objects.len(),
                detections.len()
            ),
        );

        SensorOutput {
            timestamp: elapsed_time,
            detections,
        }
    }

    #[cfg(feature = "parallel")]
    fn run_beams(&self, scene: &SceneSnapshot, step_seed: u64) -> Vec<BeamCandidates> {
        use rayon::prelude::*;

        let beams = &self.model.beam_config;
        if self.parallel {
            beams
                .par_iter()
                .map(|beam| self.process_beam(beam, scene, step_seed))
                .collect()
        } else {
            beams
                .iter()
                .map(|beam| self.process_beam(beam, scene, step_seed))
                .collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn run_beams(&self, scene: &SceneSnapshot, step_seed: u64) -> Vec<BeamCandidates> {
        self.model
            .beam_config
            .iter()
            .map(|beam| self.process_beam(beam, scene, step_seed))
            .collect()
    }

    /// Sampling, spectrum, peak extraction and noise for one beam.
    fn process_beam(&self, beam: &Beam, scene: &SceneSnapshot, step_seed: u64) -> BeamCandidates {
        let mut rng = ChaCha8Rng::seed_from_u64(step_seed);
        rng.set_stream(beam.beam_idx as u64);

        let rays = beam_rays(beam, &self.ray_offsets);
        let hits = self
            .ray_caster
            .sample_beam(&rays, scene, self.sensor.min_range, self.sensor.max_range);
        let spectrum = self.spectrum.estimate(&hits);
        let found = self.processor.extract(&spectrum, &hits);

        let p = self.sensor.detection_probability;
        let mut candidates = Vec::with_capacity(found.len());
        for candidate in found {
            if p < 1.0 && !rng.gen_bool(p) {
                continue;
            }
            candidates.push(self.noise.apply(candidate, &mut rng));
        }

        if self.logger.is_enabled(category::TRACE) {
            self.logger.log(
                category::TRACE,
                format!(
                    "beam {}: {} hits, {} candidates",
                    beam.beam_idx,
                    hits.len(),
                    candidates.len()
                ),
            );
        }

        BeamCandidates {
            beam: *beam,
            candidates,
        }
    }
}

/// Logs a configuration failure and hands it back.
fn report(logger: &Logger, error: ConfigError) -> ConfigError {
    logger.log(category::CONFIG, format!("invalid configuration: {error}"));
    error
}
