use std::sync::Arc;

use bindery::{Bindable, ErrorKind, Identifiable, Link, Linker, Options, Ref, value};

#[derive(Debug, Default, Clone, PartialEq, Bindable)]
#[bind(identifiable)]
struct Account {
    id: String,
    owner: String,
    parent: Ref<Arc<Account>>,
}

impl Identifiable for Account {
    fn identity(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Default, Bindable)]
struct Transfer {
    from: Ref<Arc<Account>>,
    to: Ref<Arc<Account>>,
    amount: u64,
}

#[derive(Debug, Default, Bindable)]
struct Ledger {
    transfers: Vec<Transfer>,
    accounts: Vec<Account>,
}

#[test]
fn references_resolve_regardless_of_order() {
    crate::init_tracing();
    let source = value!({
        "transfers": [{ "from": { "$ref": "alice" }, "to": { "$ref": "bob" }, "amount": 5 }],
        "accounts": [
            { "id": "alice", "owner": "Alice" },
            { "id": "bob", "owner": "Bob", "parent": { "$ref": "alice" } },
        ],
    });
    let mut ledger: Ledger = bindery::bind(&source, &Options::new()).unwrap();
    let mut linker = Linker::new();
    linker.register(&ledger);
    linker.resolve_references(&mut ledger).unwrap();

    let transfer = &ledger.transfers[0];
    assert_eq!(transfer.from.get().map(|a| a.owner.as_str()), Some("Alice"));
    assert_eq!(transfer.to.get().map(|a| a.owner.as_str()), Some("Bob"));
    assert!(ledger.accounts[1].parent.is_resolved());
}

#[test]
fn references_across_separate_roots() {
    let mut accounts: Vec<Account> = vec![Account {
        id: "carol".to_string(),
        owner: "Carol".to_string(),
        ..Account::default()
    }];
    let mut transfer = Transfer {
        from: Ref::new("carol"),
        ..Transfer::default()
    };
    Linker::new()
        .link(&mut [&mut transfer as &mut dyn Link, &mut accounts as &mut dyn Link])
        .unwrap();
    assert_eq!(transfer.from.get().map(|a| a.id.as_str()), Some("carol"));
    assert!(transfer.to.get().is_none());
}

fn mutual_accounts() -> (Account, Account) {
    let alice = Account {
        id: "alice".to_string(),
        owner: "Alice".to_string(),
        parent: Ref::new("bob"),
    };
    let bob = Account {
        id: "bob".to_string(),
        owner: "Bob".to_string(),
        parent: Ref::new("alice"),
    };
    (alice, bob)
}

#[test]
fn staged_resolution_alice_then_bob() {
    let (mut alice, mut bob) = mutual_accounts();
    let mut linker = Linker::new();
    linker.register(&alice);
    linker.register(&bob);
    linker.resolve_references(&mut alice).unwrap();
    linker.resolve_references(&mut bob).unwrap();
    assert_eq!(alice.parent.get().map(|a| a.owner.as_str()), Some("Bob"));
    assert_eq!(bob.parent.get().map(|a| a.owner.as_str()), Some("Alice"));
}

#[test]
fn staged_resolution_bob_then_alice() {
    let (mut alice, mut bob) = mutual_accounts();
    let mut linker = Linker::new();
    linker.register(&alice);
    linker.register(&bob);
    linker.resolve_references(&mut bob).unwrap();
    linker.resolve_references(&mut alice).unwrap();
    assert_eq!(alice.parent.get().map(|a| a.owner.as_str()), Some("Bob"));
    assert_eq!(bob.parent.get().map(|a| a.owner.as_str()), Some("Alice"));
}

#[test]
fn cycles_resolve_through_two_hops() {
    let (mut alice, mut bob) = mutual_accounts();
    Linker::new()
        .link(&mut [&mut alice as &mut dyn Link, &mut bob as &mut dyn Link])
        .unwrap();
    let via_bob = alice.parent.get().and_then(|bob| bob.parent.get());
    assert_eq!(via_bob.map(|a| a.id.as_str()), Some("alice"));
    let back_to_bob = via_bob.and_then(|alice| alice.parent.get());
    assert_eq!(back_to_bob.map(|a| a.id.as_str()), Some("bob"));
}

#[test]
fn shared_accounts_are_the_linked_targets() {
    let (alice, bob) = mutual_accounts();
    let mut accounts = vec![Arc::new(alice), Arc::new(bob)];
    let mut transfer = Transfer {
        from: Ref::new("alice"),
        to: Ref::new("bob"),
        amount: 10,
    };
    Linker::new()
        .link(&mut [&mut accounts as &mut dyn Link, &mut transfer as &mut dyn Link])
        .unwrap();

    let from = transfer.from.get().unwrap();
    assert!(Arc::ptr_eq(from, &accounts[0]));
    assert!(Arc::ptr_eq(transfer.to.get().unwrap(), &accounts[1]));
    assert!(Arc::ptr_eq(from.parent.get().unwrap(), &accounts[1]));
    assert!(Arc::ptr_eq(accounts[1].parent.get().unwrap(), &accounts[0]));
}

#[test]
fn link_errors_name_the_root_record() {
    let mut transfer = Transfer {
        from: Ref::new("ghost"),
        ..Transfer::default()
    };
    let err = Linker::new()
        .link(&mut [&mut transfer as &mut dyn Link])
        .unwrap_err();
    assert_eq!(err.path().to_string(), "Transfer.from");
}

#[test]
fn unresolved_references_fail_closed() {
    let mut ledger = Ledger {
        transfers: vec![Transfer {
            from: Ref::new("ghost"),
            ..Transfer::default()
        }],
        accounts: Vec::new(),
    };
    let mut linker = Linker::new();
    linker.register(&ledger);
    let err = linker.resolve_references(&mut ledger).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnresolvedReference);
    assert_eq!(err.path().to_string(), "Ledger.transfers[0].from");
    assert!(err.to_string().contains("Account:ghost"));
}

#[test]
fn partial_mode_tolerates_missing_targets() {
    let mut ledger = Ledger {
        transfers: vec![Transfer {
            from: Ref::new("ghost"),
            ..Transfer::default()
        }],
        accounts: Vec::new(),
    };
    let mut linker = Linker::new().with_partial(true);
    linker.register(&ledger);
    linker.resolve_references(&mut ledger).unwrap();
    assert!(!ledger.transfers[0].from.is_resolved());
    assert_eq!(ledger.transfers[0].from.raw_id(), "ghost");
}

#[test]
fn cached_registry_serves_later_operations() {
    let accounts = vec![Account {
        id: "dan".to_string(),
        ..Account::default()
    }];
    let mut linker = Linker::new().with_cache(true);
    linker.register(&accounts);

    let mut first = Transfer {
        from: Ref::new("dan"),
        ..Transfer::default()
    };
    linker.resolve_references(&mut first).unwrap();
    let mut second = Transfer {
        to: Ref::new("dan"),
        ..Transfer::default()
    };
    linker.resolve_references(&mut second).unwrap();
    assert!(first.from.is_resolved() && second.to.is_resolved());
    assert_eq!(linker.len(), 1);
}

#[test]
fn references_unbind_to_ref_maps() {
    let transfer = Transfer {
        from: Ref::new("alice"),
        to: Ref::default(),
        amount: 1,
    };
    let out = bindery::unbind(&transfer, &Options::new()).unwrap();
    assert_eq!(out["from"], value!({ "$ref": "alice" }));
    assert!(!out.contains_key("to"));
}
