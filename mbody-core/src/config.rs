//! Run requests: the plain-data boundary of the engine.
//!
//! A [`RunRequest`] describes bodies, their forces, optional constraints and
//! the engine settings. It can be written by hand in YAML or JSON and loaded
//! from disk with [`ScenarioLoader`] or [`RunRequest::from_path`].
//!
//! ```yaml
//! timestep: 0.01
//! method: rk4            # or "euler"
//! gravity: [0.0, -9.80665, 0.0]
//! steps: 200
//! enable_collisions: true
//! bodies:
//!   - identifier: left
//!     mass: 1.0
//!     position: [-1.0, 0.0]
//!     velocity: [2.0, 0.0]
//!     radius: 0.5
//!     restitution: 1.0
//!     forces:
//!       - type: drag
//!         coefficient: 0.1
//! constraints:
//!   - type: pin
//!     body: left
//!     anchor: [0.0, 1.0]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::body::Body;
use crate::constraints::Constraint;
use crate::engine::{Simulation, SimulationConfig, SimulationResult};
use crate::error::{LoadError, Result, SimError};
use crate::forces::{CustomForces, Force};
use crate::types::{constants, Vec3};

/// Largest step count a single request may ask for.
pub const MAX_STEPS: usize = 10_000;

// =============================================================================
// Descriptors
// =============================================================================

/// One force on a body. Unset parameters take the documented defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceDescriptor {
    /// constant | gravity | drag | spring | friction | custom
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub vector: Option<Vec<f64>>,
    pub direction: Option<Vec<f64>>,
    pub coefficient: Option<f64>,
    pub reference_area: Option<f64>,
    pub fluid_density: Option<f64>,
    pub anchor: Option<Vec<f64>>,
    pub stiffness: Option<f64>,
    pub damping: Option<f64>,
    pub coefficient_static: Option<f64>,
    pub coefficient_kinetic: Option<f64>,
    pub normal_force_magnitude: Option<f64>,
    /// Name of a registered callback, for `custom`
    pub name: Option<String>,
}

fn vector_or(values: &Option<Vec<f64>>, default: Vec3) -> Result<Vec3> {
    values.as_deref().map_or(Ok(default), Vec3::from_slice)
}

impl ForceDescriptor {
    pub fn of_kind(kind: &str) -> Self {
        Self {
            kind: Some(kind.to_string()),
            ..Self::default()
        }
    }

    pub fn to_force(&self, customs: &CustomForces) -> Result<Force> {
        let kind = self.kind.as_deref().unwrap_or("constant");
        let force = match kind {
            "constant" => Force::Constant {
                vector: vector_or(&self.vector, Vec3::ZERO)?,
            },
            "gravity" => Force::Gravity {
                acceleration: vector_or(&self.direction, constants::DEFAULT_GRAVITY)?,
            },
            "drag" => Force::Drag {
                coefficient: self.coefficient.unwrap_or(0.47),
                reference_area: self.reference_area.unwrap_or(1.0),
                fluid_density: self.fluid_density.unwrap_or(constants::AIR_DENSITY),
            },
            "spring" => Force::Spring {
                anchor: vector_or(&self.anchor, Vec3::ZERO)?,
                stiffness: self.stiffness.unwrap_or(10.0),
                damping: self.damping.unwrap_or(0.0),
            },
            "friction" => Force::Friction {
                coefficient_static: self.coefficient_static.unwrap_or(0.8),
                coefficient_kinetic: self.coefficient_kinetic.unwrap_or(0.6),
                normal_force_magnitude: self.normal_force_magnitude.unwrap_or(9.81),
            },
            "custom" => {
                let name = self.name.as_deref().unwrap_or_default();
                let custom = customs
                    .get(name)
                    .ok_or_else(|| SimError::UnknownCustomForce(name.to_string()))?;
                Force::Custom(custom.clone())
            }
            other => return Err(SimError::UnsupportedForce(other.to_string())),
        };
        Ok(force)
    }
}

fn default_radius() -> f64 {
    1.0
}

fn default_restitution() -> f64 {
    0.5
}

/// Initial state and material of one body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDescriptor {
    pub identifier: String,
    pub mass: f64,
    pub position: Vec<f64>,
    pub velocity: Vec<f64>,
    #[serde(default = "default_radius")]
    pub radius: f64,
    #[serde(default = "default_restitution")]
    pub restitution: f64,
    #[serde(default)]
    pub friction: f64,
    #[serde(default)]
    pub forces: Option<Vec<ForceDescriptor>>,
}

impl BodyDescriptor {
    pub fn to_body(&self, customs: &CustomForces) -> Result<Body> {
        let mut body = Body::new(
            self.identifier.as_str(),
            self.mass,
            Vec3::from_slice(&self.position)?,
            Vec3::from_slice(&self.velocity)?,
        )?
        .with_radius(self.radius)?
        .with_restitution(self.restitution)?
        .with_friction(self.friction)?;

        for descriptor in self.forces.iter().flatten() {
            body.add_force(descriptor.to_force(customs)?);
        }
        Ok(body)
    }
}

// =============================================================================
// Request / Result
// =============================================================================

fn default_timestep() -> f64 {
    SimulationConfig::default().timestep
}

fn default_method() -> String {
    SimulationConfig::default().method
}

fn default_gravity() -> Vec<f64> {
    constants::DEFAULT_GRAVITY.to_array().to_vec()
}

/// A complete simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    #[serde(default = "default_timestep")]
    pub timestep: f64,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "default_gravity")]
    pub gravity: Vec<f64>,
    pub steps: usize,
    #[serde(default)]
    pub enable_collisions: bool,
    pub bodies: Vec<BodyDescriptor>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

impl RunRequest {
    pub fn from_yaml_str(contents: &str) -> std::result::Result<Self, LoadError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn from_json_str(contents: &str) -> std::result::Result<Self, LoadError> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Read a request file, choosing the parser by extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> std::result::Result<Self, LoadError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        match extension {
            "yaml" | "yml" => Self::from_yaml_str(&fs::read_to_string(path)?),
            "json" => Self::from_json_str(&fs::read_to_string(path)?),
            _ => Err(LoadError::UnknownFormat(path.to_path_buf())),
        }
    }

    /// Check the request-level limits. The method name is deliberately not
    /// checked here; the engine rejects it when it first integrates a body.
    pub fn validate(&self) -> Result<()> {
        if !(self.timestep > 0.0) {
            return Err(SimError::InvalidRequest(format!(
                "timestep must be positive, got {}",
                self.timestep
            )));
        }
        if self.steps == 0 || self.steps > MAX_STEPS {
            return Err(SimError::InvalidRequest(format!(
                "steps must be within 1..={MAX_STEPS}, got {}",
                self.steps
            )));
        }
        if self.bodies.is_empty() {
            return Err(SimError::EmptyBodyList);
        }
        Ok(())
    }

    pub fn config(&self) -> Result<SimulationConfig> {
        Ok(SimulationConfig {
            timestep: self.timestep,
            method: self.method.clone(),
            gravity: Vec3::from_slice(&self.gravity)?,
            enable_collisions: self.enable_collisions,
            ..SimulationConfig::default()
        })
    }

    /// Validate and build a populated engine.
    pub fn build(&self, customs: &CustomForces) -> Result<Simulation> {
        self.validate()?;
        let mut simulation = Simulation::new(self.config()?);
        for descriptor in &self.bodies {
            simulation.add_body(descriptor.to_body(customs)?)?;
        }
        for constraint in &self.constraints {
            simulation.add_constraint(constraint.clone());
        }
        Ok(simulation)
    }

    pub fn run(&self, customs: &CustomForces) -> Result<RunResult> {
        let mut simulation = self.build(customs)?;
        Ok(simulation.advance(self.steps)?.into())
    }
}

/// State of one body in one step of a [`RunResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepEntry {
    pub body: String,
    pub position: [f64; 3],
    pub velocity: [f64; 3],
}

/// Serialisable form of a [`SimulationResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub total_time: f64,
    /// Per step, bodies sorted by identifier
    pub steps: Vec<Vec<StepEntry>>,
    pub energy_profile: Vec<f64>,
    pub collision_count: usize,
}

impl From<SimulationResult> for RunResult {
    fn from(result: SimulationResult) -> Self {
        let steps = result
            .steps
            .into_iter()
            .map(|snapshot| {
                snapshot
                    .into_iter()
                    .map(|(body, s)| StepEntry {
                        body,
                        position: s.position.to_array(),
                        velocity: s.velocity.to_array(),
                    })
                    .collect()
            })
            .collect();

        Self {
            total_time: result.total_time,
            steps,
            energy_profile: result.energy,
            collision_count: result.collision_count,
        }
    }
}

// =============================================================================
// Scenario files
// =============================================================================

/// Loads named run requests from a directory of `.yaml`/`.yml`/`.json` files.
pub struct ScenarioLoader {
    base_path: PathBuf,
}

const EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

impl ScenarioLoader {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Load a scenario by name (without extension).
    pub fn load(&self, name: &str) -> std::result::Result<RunRequest, LoadError> {
        let path = EXTENSIONS
            .iter()
            .map(|ext| self.base_path.join(format!("{name}.{ext}")))
            .find(|path| path.exists())
            .ok_or_else(|| {
                LoadError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("scenario not found: {name}"),
                ))
            })?;
        RunRequest::from_path(path)
    }

    /// Names of all scenarios in the directory, sorted.
    pub fn list(&self) -> std::result::Result<Vec<String>, LoadError> {
        if !self.base_path.exists() {
            return Ok(vec![]);
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            let known = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| EXTENSIONS.contains(&e));
            if !known {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        names.dedup();
        Ok(names)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forces::CustomForce;
    use crate::types::BodyState;
    use std::env;

    fn scenarios_path() -> PathBuf {
        let manifest_dir =
            env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(manifest_dir).join("..").join("scenarios")
    }

    fn body(identifier: &str) -> BodyDescriptor {
        BodyDescriptor {
            identifier: identifier.to_string(),
            mass: 1.0,
            position: vec![0.0, 0.0],
            velocity: vec![0.0, 0.0, 0.0],
            radius: 1.0,
            restitution: 0.5,
            friction: 0.0,
            forces: None,
        }
    }

    fn request(bodies: Vec<BodyDescriptor>) -> RunRequest {
        RunRequest {
            timestep: 0.01,
            method: "euler".to_string(),
            gravity: vec![0.0, -9.80665, 0.0],
            steps: 5,
            enable_collisions: false,
            bodies,
            constraints: vec![],
        }
    }

    #[test]
    fn test_force_defaults() {
        let customs = CustomForces::new();
        let drag = ForceDescriptor::of_kind("drag").to_force(&customs).unwrap();
        match drag {
            Force::Drag {
                coefficient,
                reference_area,
                fluid_density,
            } => {
                assert_eq!(coefficient, 0.47);
                assert_eq!(reference_area, 1.0);
                assert_eq!(fluid_density, 1.225);
            }
            other => panic!("expected drag, got {:?}", other),
        }

        let untyped = ForceDescriptor::default().to_force(&customs).unwrap();
        assert_eq!(untyped.kind(), "constant");
    }

    #[test]
    fn test_unsupported_force_type() {
        let customs = CustomForces::new();
        let result = ForceDescriptor::of_kind("magnetic").to_force(&customs);
        assert!(matches!(
            result,
            Err(SimError::UnsupportedForce(kind)) if kind == "magnetic"
        ));
    }

    #[test]
    fn test_custom_force_resolved_by_name() {
        let mut customs = CustomForces::new();
        customs.register(CustomForce::new("updraft", |_: &BodyState, mass: f64| {
            Vec3::new(0.0, mass, 0.0)
        }));

        let mut descriptor = ForceDescriptor::of_kind("custom");
        descriptor.name = Some("updraft".to_string());
        assert_eq!(descriptor.to_force(&customs).unwrap().kind(), "custom");

        descriptor.name = Some("downdraft".to_string());
        assert!(matches!(
            descriptor.to_force(&customs),
            Err(SimError::UnknownCustomForce(_))
        ));
    }

    #[test]
    fn test_body_descriptor_pads_2d_vectors() {
        let b = body("a").to_body(&CustomForces::new()).unwrap();
        assert_eq!(b.pos(), Vec3::ZERO);

        let mut bad = body("a");
        bad.position = vec![1.0];
        assert!(matches!(
            bad.to_body(&CustomForces::new()),
            Err(SimError::InvalidVector(1))
        ));
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            request(vec![]).validate(),
            Err(SimError::EmptyBodyList)
        ));

        let mut too_long = request(vec![body("a")]);
        too_long.steps = MAX_STEPS + 1;
        assert!(matches!(
            too_long.validate(),
            Err(SimError::InvalidRequest(_))
        ));

        let mut zero_dt = request(vec![body("a")]);
        zero_dt.timestep = 0.0;
        assert!(zero_dt.validate().is_err());

        let mut odd_method = request(vec![body("a")]);
        odd_method.method = "verlet".to_string();
        assert!(odd_method.validate().is_ok());
        assert!(matches!(
            odd_method.run(&CustomForces::new()),
            Err(SimError::UnsupportedMethod(_))
        ));
    }

    #[test]
    fn test_duplicate_identifiers_rejected() {
        let duplicated = request(vec![body("a"), body("a")]);
        let result = duplicated.build(&CustomForces::new());
        assert!(matches!(result, Err(SimError::DuplicateBody(_))));
    }

    #[test]
    fn test_run_result_sorted_by_identifier() {
        let result = request(vec![body("zeta"), body("alpha")])
            .run(&CustomForces::new())
            .unwrap();

        assert_eq!(result.steps.len(), 5);
        assert_eq!(result.energy_profile.len(), 5);
        for step in &result.steps {
            let names: Vec<&str> = step.iter().map(|e| e.body.as_str()).collect();
            assert_eq!(names, ["alpha", "zeta"]);
        }
    }

    #[test]
    fn test_parse_yaml_with_defaults() {
        let yaml = r#"
steps: 3
bodies:
  - identifier: ball
    mass: 2.0
    position: [0.0, 1.0]
    velocity: [1.0, 0.0, 0.0]
    forces:
      - type: spring
        stiffness: 4.0
"#;
        let request = RunRequest::from_yaml_str(yaml).unwrap();
        assert_eq!(request.timestep, 0.01);
        assert_eq!(request.method, "rk4");
        assert_eq!(request.gravity, vec![0.0, -9.80665, 0.0]);
        assert_eq!(request.bodies[0].radius, 1.0);
        assert_eq!(request.bodies[0].restitution, 0.5);
        assert!(request.constraints.is_empty());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{
            "method": "euler",
            "steps": 2,
            "gravity": [0, 0, 0],
            "bodies": [{"identifier": "a", "mass": 1, "position": [0, 0], "velocity": [1, 0]}]
        }"#;
        let result = RunRequest::from_json_str(json)
            .unwrap()
            .run(&CustomForces::new())
            .unwrap();
        assert_eq!(result.collision_count, 0);
        assert!((result.steps[1][0].position[0] - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_extension() {
        assert!(matches!(
            RunRequest::from_path("request.toml"),
            Err(LoadError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_load_bundled_scenarios() {
        let loader = ScenarioLoader::new(scenarios_path());
        let names = loader.list().unwrap();
        assert!(
            names.contains(&"head_on_collision".to_string()),
            "{:?}",
            names
        );

        for name in &names {
            let request = loader.load(name).unwrap();
            let result = request.run(&CustomForces::new());
            assert!(result.is_ok(), "{} failed: {:?}", name, result.err());
        }
    }

    #[test]
    fn test_load_missing_scenario() {
        let loader = ScenarioLoader::new(scenarios_path());
        assert!(matches!(
            loader.load("no_such_scenario"),
            Err(LoadError::Io(_))
        ));
    }
}
