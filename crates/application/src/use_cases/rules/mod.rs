mod add_block_rule;
mod apply_rules_to_hosts;
mod delete_block_rule;
mod get_block_rules;

pub use add_block_rule::AddBlockRuleUseCase;
pub use apply_rules_to_hosts::ApplyRulesToHostsUseCase;
pub use delete_block_rule::DeleteBlockRuleUseCase;
pub use get_block_rules::GetBlockRulesUseCase;
