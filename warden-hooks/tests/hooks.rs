mod common;

use common::{config, repository, run, RecordingRelay};
use pretty_assertions::assert_eq;
use warden_hooks::hooks::{CheckoutKind, Exit, HookInvocation, HookKind};

mod pre_commit {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn accepted_commit_is_silent() {
        let backend = repository("release").with_var("GIT_AUTHOR_NAME", "alice").with_var("USER", "alice");
        let relay = RecordingRelay::default();

        let outcome = run(&HookInvocation::PreCommit, &backend, &config(""), &relay);

        assert_eq!(outcome.exit, Exit::Success);
        assert_eq!(outcome.exit.code(), 0);
        assert_eq!(relay.attempts.get(), 0, "accepted commits are not announced");
        assert!(outcome.err.is_empty());
    }

    #[test]
    fn unknown_author_is_rejected() {
        let backend = repository("release").with_var("GIT_AUTHOR_NAME", "").with_var("USER", "alice");
        let relay = RecordingRelay::default();

        let outcome = run(&HookInvocation::PreCommit, &backend, &config(""), &relay);

        assert_eq!(outcome.exit, Exit::Rejected);
        assert_eq!(outcome.exit.code(), 1);
        assert!(outcome.err.starts_with("ERROR: Commits are not allowed to be authored by an unknown author"));
        assert!(outcome.err.contains("NO CODE HAS BEEN COMMITTED!"));

        let messages = relay.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages[0].subject,
            "Config Warden: User 'alice' has attempted to commit files to /srv/config"
        );
        assert!(messages[0].body.contains("unknown author"));
        assert!(messages[0].body.contains("warden.releasebranch: release"));
    }

    #[test]
    fn unprivileged_user_on_feature_branch_is_rejected() {
        let backend = repository("feature-x").with_var("GIT_AUTHOR_NAME", "bob").with_var("USER", "bob");
        let relay = RecordingRelay::default();

        let outcome = run(&HookInvocation::PreCommit, &backend, &config(""), &relay);

        assert_eq!(outcome.exit.code(), 1);
        for expected in ["'feature-x'", "'bob'", "'release'"] {
            assert!(outcome.err.contains(expected), "{expected} is named in {:?}", outcome.err);
        }
        assert_eq!(relay.messages().len(), 1);
    }

    #[test]
    fn whitelisted_user_may_use_any_branch() {
        let backend = repository("feature-x").with_var("GIT_AUTHOR_NAME", "alice").with_var("USER", "alice");
        let relay = RecordingRelay::default();

        let outcome = run(&HookInvocation::PreCommit, &backend, &config(""), &relay);
        assert_eq!(outcome.exit, Exit::Success);
    }

    #[test]
    fn blacklisted_author_is_rejected_even_on_the_primary_branch() {
        let backend = repository("release").with_var("GIT_AUTHOR_NAME", "ops").with_var("USER", "alice");
        let relay = RecordingRelay::default();

        let outcome = run(
            &HookInvocation::PreCommit,
            &backend,
            &config("\tblacklistauthor = ops\n"),
            &relay,
        );
        assert_eq!(outcome.exit, Exit::Rejected);
        assert!(outcome.err.contains("blacklisted author 'ops'"));
    }

    #[test]
    fn failed_delivery_keeps_the_rejection() {
        let backend = repository("feature-x").with_var("GIT_AUTHOR_NAME", "bob").with_var("USER", "bob");
        let relay = RecordingRelay::failing();

        let outcome = run(&HookInvocation::PreCommit, &backend, &config(""), &relay);

        assert_eq!(outcome.exit, Exit::Rejected);
        assert_eq!(relay.attempts.get(), 1);
        assert!(outcome.err.contains("Failed to send email to 'ops@example.org'"));
        assert!(outcome.err.contains("operations team has not been told"));
    }

    #[test]
    fn missing_primary_branch_blocks_the_commit() {
        let backend = repository("release").with_var("GIT_AUTHOR_NAME", "alice").with_var("USER", "alice");
        let relay = RecordingRelay::default();
        let config =
            gix_config::File::try_from("[warden]\n\trecipient = ops@example.org\n\tfrom = warden@example.org\n").unwrap();

        let outcome = run(&HookInvocation::PreCommit, &backend, &config, &relay);

        assert_eq!(outcome.exit, Exit::Failed(HookKind::PreCommit));
        assert_eq!(outcome.exit.code(), 1);
        assert!(outcome.err.contains("NO CODE HAS BEEN COMMITTED!"));
        let messages = relay.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].subject, "Config Warden: error in commit hook pre-commit");
        assert!(messages[0].body.contains("warden.releasebranch"));
        assert!(messages[0].body.ends_with("The commit itself was aborted."));
    }
}

mod post_commit {
    use super::*;
    use pretty_assertions::assert_eq;

    fn committed() -> warden_hooks::vcs::ScriptedBackend {
        repository("release")
            .with_var("GIT_AUTHOR_NAME", "alice")
            .with_var("USER", "alice")
            .with_output(&["status", "--short"], "")
            .with_output(&["show", "--format=", "HEAD"], "-gain = 3\n+gain = 4")
            .with_output(&["log", "--max-count=1", "HEAD"], "commit 4f2a9c1\n\n    adjust gains")
            .with_output(
                &["diff-tree", "--root", "--no-commit-id", "--name-only", "-r", "HEAD"],
                "site/Antenna1Proc.conf\nREADME",
            )
    }

    #[test]
    fn commit_is_announced() {
        let relay = RecordingRelay::default();
        let outcome = run(&HookInvocation::PostCommit, &committed(), &config(""), &relay);

        assert_eq!(outcome.exit, Exit::Success);
        let messages = relay.messages();
        assert_eq!(messages.len(), 1);
        let message = &messages[0];
        assert_eq!(message.subject, "Config Warden: Author 'alice' has committed files to /srv/config");
        assert!(message.body.contains("  * site/Antenna1Proc.conf\n"));
        assert!(!message.body.contains("  * README"));
        assert!(message.body.contains("adjust gains"));
        assert!(message.body.contains("<Clean status>"));
        assert!(message.body.contains("+gain = 4"));
    }

    #[test]
    fn debug_mode_never_touches_the_relay() {
        let relay = RecordingRelay::default();
        let outcome = run(
            &HookInvocation::PostCommit,
            &committed(),
            &config("\tdebug = true\n"),
            &relay,
        );

        assert_eq!(outcome.exit, Exit::Success);
        assert_eq!(relay.attempts.get(), 0);
        assert!(outcome.out.contains("Got args: PostCommit"));
        assert!(outcome.out.contains("would have been sent if debug mode were off"));
        assert!(outcome.out.contains("Subject: Config Warden: Author 'alice' has committed files"));
    }

    #[test]
    fn collection_failure_does_not_fail_the_commit() {
        let backend = repository("release").with_var("GIT_AUTHOR_NAME", "alice").with_var("USER", "alice");
        let relay = RecordingRelay::default();

        let outcome = run(&HookInvocation::PostCommit, &backend, &config(""), &relay);

        assert_eq!(outcome.exit, Exit::Failed(HookKind::PostCommit));
        assert_eq!(outcome.exit.code(), 0);
        assert!(outcome.err.contains("Hook failed! THIS DOES NOT AFFECT THE COMMIT"));
        let messages = relay.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].subject, "Config Warden: error in commit hook post-commit");
        assert!(messages[0].body.contains("git status --short"));
        assert!(messages[0].body.ends_with("The commit itself had already completed and is not affected."));
    }
}

mod post_checkout {
    use super::*;
    use pretty_assertions::assert_eq;

    fn checked_out() -> warden_hooks::vcs::ScriptedBackend {
        repository("main")
            .with_var("GIT_AUTHOR_NAME", "alice")
            .with_var("USER", "alice")
            .with_output(&["status", "--short"], "")
            .with_output(&["diff", "--name-only", "abc123", "9e1c0b7"], "site/Antenna1Proc.conf")
            .with_failure(
                &["describe", "--all", "--exact-match", "abc123"],
                128,
                "fatal: no tag exactly matches 'abc123'",
            )
            .with_output(&["describe", "--all", "--exact-match", "9e1c0b7"], "heads/main")
    }

    fn invocation(kind: CheckoutKind) -> HookInvocation {
        HookInvocation::PostCheckout {
            previous: "abc123".into(),
            new: "9e1c0b7".into(),
            kind,
        }
    }

    #[test]
    fn branch_checkout_is_announced_with_resolved_names() {
        let relay = RecordingRelay::default();
        let outcome = run(&invocation(CheckoutKind::Branch), &checked_out(), &config(""), &relay);

        assert_eq!(outcome.exit, Exit::Success);
        let messages = relay.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages[0].subject,
            "Config Warden: Author 'alice' has changed branch from 'abc123' to 'main' in /srv/config"
        );
        assert!(messages[0].body.contains("from 'abc123' to 'main'"));
        assert!(messages[0].body.contains("The following service configuration files have changed:\n  * site/Antenna1Proc.conf\n"));
    }

    #[test]
    fn file_checkout_subject() {
        let relay = RecordingRelay::default();
        run(&invocation(CheckoutKind::File), &checked_out(), &config(""), &relay);

        assert_eq!(
            relay.messages()[0].subject,
            "Config Warden: Author 'alice' has checked out files at 'main' in /srv/config"
        );
    }

    #[test]
    fn settings_problems_produce_a_bare_diagnostic() {
        let relay = RecordingRelay::default();
        let config = gix_config::File::try_from("[warden]\n\tfrom = warden@example.org\n").unwrap();

        let outcome = run(&invocation(CheckoutKind::Branch), &checked_out(), &config, &relay);

        assert_eq!(outcome.exit, Exit::Failed(HookKind::PostCheckout));
        assert_eq!(outcome.exit.code(), 0);
        assert_eq!(relay.attempts.get(), 0);
        assert!(outcome.err.contains("warden.recipient"));
        assert!(outcome.err.contains("THIS DOES NOT AFFECT THE CHECKOUT"));
    }
}
