use twilight_model::guild::Permissions;

use crate::error::PermissionDenied;

/// Outcome of checking a node's permission requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionResult {
    Granted,
    Denied(PermissionDenied),
}

impl PermissionResult {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionResult::Granted)
    }
}

/// Whether `held` satisfies `required`. Administrators satisfy everything.
pub fn holds(held: Permissions, required: Permissions) -> bool {
    held.contains(Permissions::ADMINISTRATOR) || held.contains(required)
}

/// Caller requirements are checked before the bot's.
pub fn check(
    caller_required: Permissions,
    bot_required: Permissions,
    caller: Permissions,
    bot: Permissions,
) -> PermissionResult {
    if !holds(caller, caller_required) {
        return PermissionResult::Denied(PermissionDenied::Caller);
    }
    if !holds(bot, bot_required) {
        return PermissionResult::Denied(PermissionDenied::Bot);
    }
    PermissionResult::Granted
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Permissions::empty(), Permissions::empty(), PermissionResult::Granted)]
    #[case(Permissions::MANAGE_GUILD, Permissions::empty(), PermissionResult::Denied(PermissionDenied::Caller))]
    #[case(Permissions::empty(), Permissions::EMBED_LINKS, PermissionResult::Denied(PermissionDenied::Bot))]
    #[case(Permissions::MANAGE_GUILD, Permissions::EMBED_LINKS, PermissionResult::Denied(PermissionDenied::Caller))]
    fn checks_requirements_against_nobody(
        #[case] caller_required: Permissions,
        #[case] bot_required: Permissions,
        #[case] expected: PermissionResult,
    ) {
        let held = Permissions::SEND_MESSAGES;
        assert_eq!(check(caller_required, bot_required, held, held), expected);
    }

    #[test]
    fn administrator_satisfies_any_requirement() {
        assert!(holds(
            Permissions::ADMINISTRATOR,
            Permissions::MANAGE_GUILD | Permissions::BAN_MEMBERS
        ));
    }
}
