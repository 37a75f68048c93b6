//! Stateless block and deploy checks run before anything is executed.

use crate::config::ValidationConfig;
use crate::domain::{DeployError, ValidationError, ValidationResult};
use shared_crypto::verify_signature;
use shared_types::{Block, Deploy};
use std::collections::HashSet;

/// Stateless validation logic for blocks and their deploys.
pub struct BlockValidator;

impl BlockValidator {
    /// Block hash, protocol version and proposer signature.
    pub fn validate_header(block: &Block, config: &ValidationConfig) -> ValidationResult<()> {
        if !block.has_valid_hash() {
            return Err(ValidationError::InvalidBlockHash);
        }

        if block.protocol_version != config.protocol_version {
            return Err(ValidationError::ProtocolVersionMismatch {
                expected: config.protocol_version,
                actual: block.protocol_version,
            });
        }

        match verify_signature(&block.hash, &block.signature, &block.proposer) {
            Ok(true) => Ok(()),
            Ok(false) | Err(_) => Err(ValidationError::InvalidBlockSignature),
        }
    }

    /// Deploy count, block gas and every deploy's own checks.
    ///
    /// Returns the summed gas limit of the block.
    pub fn validate_deploys(block: &Block, config: &ValidationConfig) -> ValidationResult<u64> {
        if block.deploys.len() > config.max_deploys_per_block {
            return Err(ValidationError::TooManyDeploys {
                count: block.deploys.len(),
                limit: config.max_deploys_per_block,
            });
        }

        let mut seen = HashSet::with_capacity(block.deploys.len());
        let mut total_gas: u64 = 0;
        for (index, deploy) in block.deploys.iter().enumerate() {
            if !seen.insert(deploy.hash) {
                return Err(ValidationError::InvalidDeploy {
                    index,
                    reason: DeployError::Duplicate,
                });
            }
            DeployValidator::validate(deploy, block.timestamp, config)
                .map_err(|reason| ValidationError::InvalidDeploy { index, reason })?;
            total_gas = total_gas.saturating_add(deploy.header.gas_limit);
        }

        if total_gas > config.max_block_gas {
            return Err(ValidationError::BlockGasExceeded {
                used: total_gas,
                limit: config.max_block_gas,
            });
        }

        Ok(total_gas)
    }
}

/// Checks a single deploy in isolation.
pub struct DeployValidator;

impl DeployValidator {
    pub fn validate(
        deploy: &Deploy,
        block_timestamp: u64,
        config: &ValidationConfig,
    ) -> Result<(), DeployError> {
        Self::validate_hashes(deploy)?;
        Self::validate_header(deploy, block_timestamp, config)?;
        Self::validate_approvals(deploy)
    }

    fn validate_hashes(deploy: &Deploy) -> Result<(), DeployError> {
        if !deploy.has_valid_body_hash() {
            return Err(DeployError::InvalidBodyHash);
        }
        if !deploy.has_valid_hash() {
            return Err(DeployError::InvalidDeployHash);
        }
        Ok(())
    }

    fn validate_header(
        deploy: &Deploy,
        block_timestamp: u64,
        config: &ValidationConfig,
    ) -> Result<(), DeployError> {
        let header = &deploy.header;

        if header.chain_name != config.chain_name {
            return Err(DeployError::WrongChainName {
                expected: config.chain_name.clone(),
                actual: header.chain_name.clone(),
            });
        }

        if header.gas_limit == 0 {
            return Err(DeployError::ZeroGasLimit);
        }
        if header.gas_limit > config.max_deploy_gas {
            return Err(DeployError::GasLimitExceeded {
                limit: header.gas_limit,
                max: config.max_deploy_gas,
            });
        }

        if header.ttl_ms > config.max_deploy_ttl_ms {
            return Err(DeployError::TtlTooLong {
                ttl_ms: header.ttl_ms,
                max_ms: config.max_deploy_ttl_ms,
            });
        }
        if header.timestamp > block_timestamp {
            return Err(DeployError::FutureTimestamp {
                timestamp: header.timestamp,
                block_timestamp,
            });
        }
        if header.expired_at(block_timestamp) {
            return Err(DeployError::Expired {
                expired_at: header.timestamp.saturating_add(header.ttl_ms),
                block_timestamp,
            });
        }

        Ok(())
    }

    fn validate_approvals(deploy: &Deploy) -> Result<(), DeployError> {
        if deploy.approvals.is_empty() {
            return Err(DeployError::MissingApprovals);
        }
        if !deploy
            .approvals
            .iter()
            .any(|approval| approval.signer == deploy.header.account)
        {
            return Err(DeployError::MissingAccountApproval);
        }

        for (index, approval) in deploy.approvals.iter().enumerate() {
            match verify_signature(&deploy.hash, &approval.signature, &approval.signer) {
                Ok(true) => {}
                Ok(false) => return Err(DeployError::InvalidApproval { index }),
                Err(source) => return Err(DeployError::InvalidApprovalKey { index, source }),
            }
        }
        Ok(())
    }
}
