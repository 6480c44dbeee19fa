//! Application bootstrap from configuration: in-memory resources, token
//! authentication and the URL rule.

use std::sync::Arc;

use tracing::info;

use crate::auth::{ChainValidator, CompositeAuth, Identity, JwtConfig, JwtValidator, StaticTokenValidator};
use crate::config::{AeroRestConfig, ConfigError, ConfigResult, ResourceConfig};
use crate::controller::{ActiveController, Controller, ControllerSettings, OwnerAccess};
use crate::routing::UrlRuleConfig;
use crate::store::InMemoryStore;

use super::{Application, Module};

/// JWT validator for the configured secret, if any
pub fn jwt_validator(config: &AeroRestConfig) -> Option<JwtValidator> {
    config.jwt_secret.as_ref().map(|secret| {
        JwtValidator::new(
            JwtConfig::new(secret.clone())
                .with_issuer(config.jwt_issuer.clone())
                .with_audience(config.jwt_audience.clone()),
        )
    })
}

fn settings(config: &AeroRestConfig) -> ControllerSettings {
    ControllerSettings {
        key_delimiter: config.key_delimiter.clone(),
        default_page_size: config.default_page_size,
        max_page_size: config.max_page_size,
    }
}

fn build_controller(resource: &ResourceConfig, settings: ControllerSettings) -> ConfigResult<Arc<dyn Controller>> {
    let store = InMemoryStore::from_parts(
        resource.url.clone(),
        resource.attributes.clone(),
        resource.primary_key.clone(),
    )
    .with_records(resource.records.clone())
    .map_err(|e| ConfigError::Invalid(format!("resource '{}': {}", resource.url, e)))?;

    let mut controller = ActiveController::new(resource.controller.clone(), Arc::new(store))
        .with_settings(settings);
    for action in &resource.public {
        controller = controller.public(action);
    }
    if let Some(owner_field) = &resource.owner_field {
        let owner = OwnerAccess::new(owner_field.clone());
        controller = controller
            .with_record_access(owner.clone())
            .with_scope(move |ctx| owner.scope(ctx.identity()));
    }
    Ok(Arc::new(controller))
}

impl Application {
    /// Build an application serving the configured resources
    pub fn from_config(config: &AeroRestConfig) -> ConfigResult<Application> {
        let mut rule = UrlRuleConfig {
            prefix: config.prefix.clone(),
            resources: Vec::new(),
            only: config.only.clone(),
            except: config.except.clone(),
        };

        let mut tokens = StaticTokenValidator::new();
        for token in &config.tokens {
            let identity = token
                .roles
                .iter()
                .fold(Identity::new(token.identity.clone()), |identity, role| identity.with_role(role.clone()));
            tokens = tokens.with_token(token.token.clone(), identity);
        }
        let mut validator = ChainValidator::new().with(tokens);
        if let Some(jwt) = jwt_validator(config) {
            validator = validator.with(jwt);
        }

        let mut controllers = Vec::new();
        let mut modules = Vec::new();
        for resource in &config.resources {
            let controller = build_controller(resource, settings(config))?;
            match &resource.module {
                Some(module) => {
                    rule = rule.resource(resource.url.clone(), module.clone());
                    modules.push(Module::new(module.clone(), resource.controller.clone()).controller(controller));
                }
                None => {
                    rule = rule.resource(resource.url.clone(), resource.controller.clone());
                    controllers.push(controller);
                }
            }
        }

        let mut builder = Application::builder(rule)
            .auth(Arc::new(CompositeAuth::token(Arc::new(validator), &config.token_query_param)))
            .anonymous_options(config.anonymous_options);
        for controller in controllers {
            builder = builder.controller(controller);
        }
        for module in modules {
            builder = builder.module(module);
        }

        let app = builder.build();
        info!(
            resources = config.resources.len(),
            rules = app.route_table().len(),
            "application bootstrapped"
        );
        Ok(app)
    }
}
