use anchor_lang::prelude::*;

use crate::config::DividendConfig;
use crate::error::{classify, DividendError, ErrorKind};
use crate::instructions::{DividendParams, ExclusionChoice};
use crate::state::*;
use crate::test::mock_chain::*;
use crate::utils::DividendAction;
use crate::DividendSession;

fn code(err: &anchor_lang::error::Error) -> Option<DividendError> {
    DividendError::from_anchor(err)
}

fn params(now: i64) -> DividendParams {
    DividendParams {
        name: "Q3 dividend".to_string(),
        amount: 100,
        maturity: now,
        expiry: Some(now + 600),
        ..DividendParams::default()
    }
}

#[test]
fn test_bind_requires_attached_module() {
    let chain = MockChain::new();
    let mut ledger = chain.clone();
    let err = DividendSession::bind(
        key(100),
        Currency::NativeCoin,
        DividendConfig::default(),
        &mut ledger,
        &chain,
    )
    .unwrap_err();
    assert_eq!(code(&err), Some(DividendError::ModuleNotAttached));
    assert!(chain.submissions().is_empty());
}

#[test]
fn test_bind_attaches_module_when_allowed() {
    let chain = MockChain::new();
    let mut ledger = chain.clone();
    let config = DividendConfig {
        auto_attach_module: true,
        ..DividendConfig::default()
    };
    let session =
        DividendSession::bind(key(100), Currency::NativeCoin, config, &mut ledger, &chain).unwrap();

    assert_eq!(session.binding.module, chain.module_info(Currency::NativeCoin).address);
    assert_eq!(session.currency(), Currency::NativeCoin);
    assert!(matches!(
        chain.submissions().as_slice(),
        [DividendAction::AttachModule { .. }]
    ));
}

#[test]
fn test_bind_token_module_uses_token_mint() {
    let fixture = Fixture::new(Currency::PrimaryToken);
    assert_eq!(fixture.session.binding.currency_mint, fixture.chain.token_mint());
    assert_eq!(fixture.submission_count(), 0);
}

#[test]
fn test_create_dividend_records_deposit() {
    let mut fixture = Fixture::new(Currency::PrimaryToken);
    let index = fixture.create_dividend("Q3 dividend", 100);

    let dividend = fixture.session.dividend(index).unwrap();
    assert_eq!(index, 0);
    assert_eq!(dividend.total_amount, 100);
    assert_eq!(dividend.checkpoint_id, 1);
    assert_eq!(dividend.created_at, START_TIME);
    assert_eq!(dividend.expiry, START_TIME + 600);
    assert_eq!(*dividend, fixture.chain.dividend(Currency::PrimaryToken, index));

    let issuer = fixture.issuer;
    assert_eq!(
        fixture.chain.currency_balance_of(Currency::PrimaryToken, issuer),
        1_000_000 - 100
    );
    // Checkpoint first, then the deposit
    assert_eq!(fixture.submission_count(), 2);
}

#[test]
fn test_create_dividend_defaults_expiry_window() {
    let mut fixture = Fixture::new(Currency::NativeCoin);
    let now = fixture.chain.now();
    let params = DividendParams {
        expiry: None,
        ..params(now)
    };
    let index = fixture.run(|s, ctx| s.create_dividend(ctx, params)).unwrap();
    assert_eq!(fixture.session.dividend(index).unwrap().expiry, now + 10 * 60);
}

#[test]
fn test_create_dividend_validation() {
    let mut fixture = Fixture::new(Currency::PrimaryToken);
    let now = fixture.chain.now();

    let cases = vec![
        (
            DividendParams { name: String::new(), ..params(now) },
            DividendError::InvalidName,
        ),
        (
            DividendParams { name: "x".repeat(33), ..params(now) },
            DividendError::InvalidName,
        ),
        (DividendParams { amount: 0, ..params(now) }, DividendError::InvalidAmount),
        (
            DividendParams { expiry: Some(now), maturity: now, ..params(now) },
            DividendError::InvalidWindow,
        ),
        (
            DividendParams { maturity: now - 301, ..params(now) },
            DividendError::InvalidWindow,
        ),
        (
            DividendParams { maturity: now - 700, expiry: Some(now - 1), ..params(now) },
            DividendError::InvalidWindow,
        ),
    ];

    for (params, expected) in cases {
        let err = fixture
            .run(|s, ctx| s.create_dividend(ctx, params))
            .unwrap_err();
        assert_eq!(code(&err), Some(expected));
        assert_eq!(classify(&err), ErrorKind::Validation);
    }
    assert_eq!(fixture.submission_count(), 0, "nothing should be submitted");
}

#[test]
fn test_maturity_within_grace_is_accepted() {
    let mut fixture = Fixture::new(Currency::PrimaryToken);
    let now = fixture.chain.now();
    let params = DividendParams {
        maturity: now - 300,
        ..params(now)
    };
    assert!(fixture.run(|s, ctx| s.create_dividend(ctx, params)).is_ok());
}

#[test]
fn test_insufficient_funds_submits_nothing() {
    let mut fixture = Fixture::new(Currency::NativeCoin);
    let issuer = fixture.issuer;
    fixture.chain.fund(Currency::NativeCoin, issuer, 99);

    let now = fixture.chain.now();
    let err = fixture
        .run(|s, ctx| s.create_dividend(ctx, params(now)))
        .unwrap_err();
    assert_eq!(code(&err), Some(DividendError::InsufficientFunds));
    assert_eq!(classify(&err), ErrorKind::Precondition);
    assert_eq!(fixture.submission_count(), 0);
    assert!(fixture.session.dividends.is_empty());
}

#[test]
fn test_failed_submission_leaves_no_dividend() {
    let mut fixture = Fixture::new(Currency::PrimaryToken);
    fixture.chain.fail_next_submit();

    let now = fixture.chain.now();
    let err = fixture
        .run(|s, ctx| s.create_dividend(ctx, params(now)))
        .unwrap_err();
    assert_eq!(classify(&err), ErrorKind::Collaborator);
    assert!(code(&err).is_none(), "ledger error should pass through");
    assert!(fixture.session.dividends.is_empty());
    assert_eq!(fixture.session.checkpoints.current_id(), 0);
}

#[test]
fn test_default_exclusions_do_not_affect_existing_dividends() {
    let mut fixture = Fixture::new(Currency::PrimaryToken);
    let c = key(HOLDER_C);
    let a = key(HOLDER_A);

    let raw = vec![c.to_string(), "garbage".to_string(), c.to_string()];
    let report = fixture
        .run(|s, ctx| s.set_default_exclusions(ctx, &raw))
        .unwrap();
    assert_eq!(report.set.as_slice(), &[c]);
    assert_eq!(report.rejected, 1);
    assert_eq!(fixture.chain.default_exclusions(Currency::PrimaryToken), vec![c]);

    let first = fixture.create_dividend("First", 100);

    fixture
        .run(|s, ctx| s.set_default_exclusions(ctx, &[a.to_string()]))
        .unwrap();
    let second = fixture.create_dividend("Second", 100);

    let first_dividend = fixture.session.dividend(first).unwrap();
    assert!(first_dividend.is_excluded(&c));
    assert!(!first_dividend.is_excluded(&a));
    assert!(fixture.session.dividend(second).unwrap().is_excluded(&a));

    let (c_first, a_first) = fixture.run(|s, ctx| {
        (
            s.calculate_dividend(ctx, first, &c).unwrap(),
            s.calculate_dividend(ctx, first, &a).unwrap(),
        )
    });
    assert!(c_first.is_zero());
    assert_eq!(a_first, DividendSplit { net: 30, withheld: 0 });
}

#[test]
fn test_override_exclusions_leave_default_untouched() {
    let mut fixture = Fixture::new(Currency::PrimaryToken);
    let b = key(HOLDER_B);
    let report = fixture.session.materialize_override(&[b.to_string()]).unwrap();

    let now = fixture.chain.now();
    let params = DividendParams {
        exclusions: ExclusionChoice::Override(report.set),
        ..params(now)
    };
    let index = fixture.run(|s, ctx| s.create_dividend(ctx, params)).unwrap();

    assert!(fixture.session.dividend(index).unwrap().is_excluded(&b));
    assert!(fixture.session.exclusions.get_default().is_empty());
}

#[test]
fn test_exclusion_file_source() {
    let fixture = Fixture::new(Currency::PrimaryToken);
    let text = format!("{}\n\n  {}\n", key(HOLDER_A), key(HOLDER_B));
    let report = fixture.session.materialize_from(&LineSource::new(&text)).unwrap();
    assert_eq!(report.set.as_slice(), &[key(HOLDER_A), key(HOLDER_B)]);
}

#[test]
fn test_too_many_exclusions() {
    let mut fixture = Fixture::new(Currency::PrimaryToken);
    let raw: Vec<String> = (1..=51u8).map(|n| key(n).to_string()).collect();
    let err = fixture
        .run(|s, ctx| s.set_default_exclusions(ctx, &raw))
        .unwrap_err();
    assert_eq!(code(&err), Some(DividendError::TooManyExclusions));

    // An override built outside validation is still bounded
    let now = fixture.chain.now();
    let params = DividendParams {
        exclusions: ExclusionChoice::Override(ExclusionSet::from_addresses(
            (1..=51u8).map(key),
        )),
        ..params(now)
    };
    let err = fixture
        .run(|s, ctx| s.create_dividend(ctx, params))
        .unwrap_err();
    assert_eq!(code(&err), Some(DividendError::TooManyExclusions));
    assert_eq!(fixture.submission_count(), 0);
}

#[test]
fn test_withholding_last_write_wins() {
    let mut fixture = Fixture::new(Currency::PrimaryToken);
    let index = fixture.create_dividend("Q3", 100);
    let b = key(HOLDER_B);

    fixture
        .run(|s, ctx| s.set_withholding_fixed(ctx, &[b], 50))
        .unwrap();
    fixture
        .run(|s, ctx| s.set_withholding_fixed(ctx, &[b], 20))
        .unwrap();

    // Applies to a dividend created before the write
    let split = fixture
        .run(|s, ctx| s.calculate_dividend(ctx, index, &b))
        .unwrap();
    assert_eq!(split, DividendSplit { net: 16, withheld: 4 });

    let err = fixture
        .run(|s, ctx| s.set_withholding_fixed(ctx, &[b], 101))
        .unwrap_err();
    assert_eq!(code(&err), Some(DividendError::InvalidPercentage));
    assert_eq!(fixture.session.withholding.percentage_of(&b), 20);
}

#[test]
fn test_withholding_for_several_holders() {
    let mut fixture = Fixture::new(Currency::NativeCoin);
    let payees = [key(HOLDER_A), key(HOLDER_C)];
    fixture
        .run(|s, ctx| s.set_withholding_fixed(ctx, &payees, 10))
        .unwrap();
    assert_eq!(fixture.session.withholding.percentage_of(&key(HOLDER_A)), 10);
    assert_eq!(fixture.session.withholding.percentage_of(&key(HOLDER_C)), 10);
    assert_eq!(fixture.session.withholding.percentage_of(&key(HOLDER_B)), 0);

    let err = fixture
        .run(|s, ctx| s.set_withholding_fixed(ctx, &[], 10))
        .unwrap_err();
    assert_eq!(code(&err), Some(DividendError::EmptyBatch));
}

#[test]
fn test_status_and_filters_follow_the_clock() {
    let mut fixture = Fixture::new(Currency::PrimaryToken);
    let now = fixture.chain.now();
    let params = DividendParams {
        maturity: now + 100,
        expiry: Some(now + 200),
        ..params(now)
    };
    let index = fixture.run(|s, ctx| s.create_dividend(ctx, params)).unwrap();

    let pushable = |fixture: &mut Fixture| -> Vec<u32> {
        fixture.run(|s, ctx| {
            s.select_dividends(ctx, DividendFilter::pushable())
                .iter()
                .map(|d| d.index)
                .collect()
        })
    };

    assert_eq!(
        fixture.run(|s, ctx| s.status(ctx, index)).unwrap(),
        DividendStatus::PendingMaturity
    );
    assert!(pushable(&mut fixture).is_empty());

    fixture.chain.advance(100);
    assert_eq!(
        fixture.run(|s, ctx| s.status(ctx, index)).unwrap(),
        DividendStatus::Claimable
    );
    assert_eq!(pushable(&mut fixture), vec![index]);

    fixture.chain.advance(100);
    assert_eq!(
        fixture.run(|s, ctx| s.status(ctx, index)).unwrap(),
        DividendStatus::Expired
    );
    assert!(pushable(&mut fixture).is_empty());
}

#[test]
fn test_explore_dividend_balance() {
    let mut fixture = Fixture::new(Currency::PrimaryToken);
    let index = fixture.create_dividend("Q3", 100);
    let b = key(HOLDER_B);
    fixture
        .run(|s, ctx| s.set_withholding_fixed(ctx, &[b], 10))
        .unwrap();

    let before = fixture
        .run(|s, ctx| s.explore_dividend_balance(ctx, index, &b))
        .unwrap();
    assert_eq!(before.currency_balance, 0);
    assert_eq!(before.split, DividendSplit { net: 18, withheld: 2 });
    assert!(!before.claimed);

    fixture.push(index, &[b]).unwrap();
    let after = fixture
        .run(|s, ctx| s.explore_dividend_balance(ctx, index, &b))
        .unwrap();
    assert_eq!(after.currency_balance, 18);
    assert!(after.claimed);
}

#[test]
fn test_unknown_dividend() {
    let mut fixture = Fixture::new(Currency::PrimaryToken);
    let payee = Pubkey::new_from_array([1; 32]);
    let err = fixture
        .run(|s, ctx| s.calculate_dividend(ctx, 3, &payee))
        .unwrap_err();
    assert_eq!(code(&err), Some(DividendError::DividendNotFound));
}

#[test]
fn test_rebound_session_loads_module_state() {
    let mut fixture = Fixture::new(Currency::PrimaryToken);
    let (a, b) = (key(HOLDER_A), key(HOLDER_B));
    fixture
        .run(|s, ctx| s.set_default_exclusions(ctx, &[a.to_string()]))
        .unwrap();
    fixture
        .run(|s, ctx| s.set_withholding_fixed(ctx, &[b], 10))
        .unwrap();
    let first = fixture.create_dividend("First", 100);

    // A new operator process on the same ledger
    let mut ledger = fixture.chain.clone();
    let session = DividendSession::bind(
        fixture.issuer,
        Currency::PrimaryToken,
        DividendConfig::default(),
        &mut ledger,
        &fixture.chain,
    )
    .unwrap();
    assert_eq!(session.exclusions.get_default().as_slice(), &[a]);
    assert_eq!(session.withholding.percentage_of(&b), 10);
    assert_eq!(session.dividends.len(), 1);
    assert_eq!(
        session.dividend(first).unwrap(),
        &fixture.chain.dividend(Currency::PrimaryToken, first)
    );
    fixture.session = session;

    let second = fixture.create_dividend("Second", 100);
    assert!(fixture.session.dividend(second).unwrap().is_excluded(&a));

    let (split_a, split_b) = fixture.run(|s, ctx| {
        (
            s.calculate_dividend(ctx, second, &a).unwrap(),
            s.calculate_dividend(ctx, second, &b).unwrap(),
        )
    });
    assert!(split_a.is_zero());
    assert_eq!(split_b, DividendSplit { net: 18, withheld: 2 });

    let results = fixture.push(second, &[a, b]).unwrap();
    assert!(!results[0].is_paid());
    assert!(results[1].is_paid());
    assert_eq!(fixture.session.dividends_by_checkpoint(2).len(), 1);
}

#[test]
fn test_default_exclusions_set_elsewhere_are_applied() {
    let mut fixture = Fixture::new(Currency::NativeCoin);
    let c = key(HOLDER_C);

    // Another operator replaces the default after this session was bound
    let mut ledger = fixture.chain.clone();
    let mut other = DividendSession::bind(
        key(101),
        Currency::NativeCoin,
        DividendConfig::default(),
        &mut ledger,
        &fixture.chain,
    )
    .unwrap();
    let mut ctx = other.context(&mut ledger, &fixture.chain, &fixture.chain);
    other.set_default_exclusions(&mut ctx, &[c.to_string()]).unwrap();
    assert!(fixture.session.exclusions.get_default().is_empty());

    let index = fixture.create_dividend("Q3", 100);
    assert!(fixture.session.dividend(index).unwrap().is_excluded(&c));

    fixture.run(|s, ctx| s.sync_module(ctx)).unwrap();
    assert_eq!(fixture.session.exclusions.get_default().as_slice(), &[c]);
}
