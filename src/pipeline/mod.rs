// ABOUTME: Top-level per-service state machine driving configure, seal, deploy.
// ABOUTME: Walks classify -> apply/crypto -> rollout, one service at a time.

mod operator;
mod plan;

pub use operator::{Operator, ScriptedOperator, StdOperator};
pub use plan::{Decision, PlanError, Step, plan};

use crate::config::{Manifest, ServiceSpec, TransformKind, TransformSpec};
use crate::crypto::CryptoGateway;
use crate::deploy::{CollisionPolicy, DeploymentTarget, Rollout};
use crate::envfile::{self, ConfigState, TransformParams};
use crate::error::{Error, Result};
use crate::output::Output;
use crate::runtime::{ContainerFilters, ContainerOps, ContainerState, ImageOps};

/// Per-service report produced by the status command.
#[derive(Debug)]
pub struct ServiceStatus {
    pub service: String,
    pub config: Option<ConfigState>,
    pub container: Option<ContainerState>,
}

/// The pipeline orchestrator.
///
/// Strictly sequential: services run one after another in manifest order,
/// and every external call is awaited before the next begins. The operator
/// decision for encrypted files can be fixed up front (`default_decision`)
/// for non-interactive paths such as boot.
pub struct Pipeline<'a, R, O> {
    manifest: &'a Manifest,
    runtime: &'a R,
    crypto: CryptoGateway,
    operator: O,
    output: &'a Output,
    policy: CollisionPolicy,
    default_decision: Option<Decision>,
}

impl<'a, R, O> Pipeline<'a, R, O>
where
    R: ImageOps + ContainerOps,
    O: Operator,
{
    pub fn new(
        manifest: &'a Manifest,
        runtime: &'a R,
        operator: O,
        output: &'a Output,
        policy: CollisionPolicy,
    ) -> Self {
        Self {
            manifest,
            runtime,
            crypto: CryptoGateway::new(&manifest.crypto),
            operator,
            output,
            policy,
            default_decision: None,
        }
    }

    /// Fix the encrypted-file decision instead of prompting. Used by the
    /// boot path, which must run unattended.
    pub fn with_default_decision(mut self, decision: Decision) -> Self {
        self.default_decision = Some(decision);
        self
    }

    /// Run the pipeline for every service in manifest order, failing fast.
    pub async fn run(&mut self) -> Result<Vec<DeploymentTarget>> {
        let manifest = self.manifest;
        let mut targets = Vec::new();
        for service in manifest.services.iter() {
            let target = self.run_service(service).await?;
            targets.push(target);
        }
        Ok(targets)
    }

    /// Run the pipeline for a single service.
    pub async fn run_service(&mut self, spec: &ServiceSpec) -> Result<DeploymentTarget> {
        self.output
            .progress(&format!("==> {} ({})", spec.name, spec.image));

        let Some(transform) = spec.transform.clone() else {
            // No secure configuration for this service; deploy directly.
            return self.deploy(spec).await;
        };

        let state = envfile::classify(&spec.env_file, &transform.marker)?;
        tracing::debug!(service = %spec.name, %state, "classified configuration file");

        let decision = match state {
            ConfigState::Encrypted => Some(self.decide_for_encrypted(spec)?),
            _ => None,
        };

        let steps = plan(state, decision)
            .map_err(|e| Error::InvalidInput(e.to_string()))?;

        let mut target = None;
        for step in steps {
            match step {
                Step::Apply => {
                    let params = self.gather_params(&transform)?;
                    let changed = envfile::apply_file(&spec.env_file, &transform.rule(), &params)?;
                    if changed {
                        self.output
                            .progress(&format!("  configured {}", spec.env_file.display()));
                    } else {
                        self.output.progress("  already configured, verified marker");
                    }
                }
                Step::Encrypt => {
                    self.crypto.encrypt(&spec.env_file, &transform.marker).await?;
                    self.output
                        .progress(&format!("  encrypted {}", spec.env_file.display()));
                }
                Step::Decrypt => {
                    self.crypto.decrypt(&spec.env_file, &transform.marker).await?;
                    self.output
                        .progress(&format!("  decrypted {}", spec.env_file.display()));
                }
                Step::Deploy => {
                    target = Some(self.deploy(spec).await?);
                }
            }
        }

        target.ok_or_else(|| Error::Deploy(format!("{}: plan ended without deploying", spec.name)))
    }

    // The single operator-driven branch point of the state machine.
    fn decide_for_encrypted(&mut self, spec: &ServiceSpec) -> Result<Decision> {
        if let Some(decision) = self.default_decision {
            return Ok(decision);
        }

        let keep = self.operator.confirm(&format!(
            "{} is encrypted; keep it encrypted and deploy",
            spec.name
        ))?;
        if keep {
            return Ok(Decision::KeepEncrypted);
        }

        let reapply = self
            .operator
            .confirm("re-run configuration after decrypting")?;
        Ok(Decision::Decrypt { reapply })
    }

    fn gather_params(&mut self, transform: &TransformSpec) -> Result<TransformParams> {
        match transform.kind {
            TransformKind::Credential => {
                let user = self.operator.prompt_line("search-engine user")?;
                let secret = self.operator.prompt_line("search-engine password")?;
                let endpoint = self.operator.prompt_line("search-engine endpoint")?;
                Ok(TransformParams::Credential {
                    user,
                    secret,
                    endpoint,
                })
            }
            TransformKind::HardwareId => Ok(self.manifest.hardware_params()),
        }
    }

    async fn deploy(&self, spec: &ServiceSpec) -> Result<DeploymentTarget> {
        let registry = self.manifest.registry.clone();

        let rollout = Rollout::new(spec.clone(), self.manifest.stop_timeout)
            .ensure_image(self.runtime, move || match registry {
                Some(registry) => registry
                    .resolve()
                    .map(Some)
                    .map_err(|e| crate::deploy::DeployError::LoginFailed(e.to_string())),
                None => Ok(None),
            })
            .await?
            .start(self.runtime, self.policy)
            .await?;

        let target = rollout.target();
        if target.recreated {
            self.output
                .progress(&format!("  deployed container {}", target.container));
        } else {
            self.output
                .progress(&format!("  container {} already running", target.container));
        }
        Ok(target)
    }
}

/// Report the configuration and container state of every service.
pub async fn status<R: ContainerOps>(
    manifest: &Manifest,
    runtime: &R,
) -> Result<Vec<ServiceStatus>> {
    let mut statuses = Vec::new();

    for spec in manifest.services.iter() {
        let config = match &spec.transform {
            Some(transform) => match envfile::classify(&spec.env_file, &transform.marker) {
                Ok(state) => Some(state),
                Err(envfile::InspectError::ConfigMissing(_)) => None,
                Err(e) => return Err(e.into()),
            },
            None => None,
        };

        let filters = ContainerFilters {
            name: Some(spec.name.to_string()),
            all: true,
            ..Default::default()
        };
        let container = runtime
            .list_containers(&filters)
            .await
            .map_err(|e| Error::Deploy(e.to_string()))?
            .into_iter()
            .next()
            .map(|c| c.state);

        statuses.push(ServiceStatus {
            service: spec.name.to_string(),
            config,
            container,
        });
    }

    Ok(statuses)
}
