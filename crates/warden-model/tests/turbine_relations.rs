//! End-to-end tests for the turbine model's ternary relations.

use std::sync::Arc;
use warden_model::{
    EntityManager, GroupManager, MemoryStore, RoleManager, TurbineModelManager, UserManager,
    GLOBAL_GROUP_NAME,
};
use warden_types::{Group, Role, SecurityEntity, User};

struct World {
    store: Arc<MemoryStore>,
    users: UserManager<MemoryStore>,
    groups: GroupManager<MemoryStore>,
    roles: RoleManager<MemoryStore>,
    model: TurbineModelManager,
}

fn world() -> World {
    let store = Arc::new(MemoryStore::new());
    World {
        users: EntityManager::new(Arc::clone(&store)),
        groups: EntityManager::new(Arc::clone(&store)),
        roles: EntityManager::new(Arc::clone(&store)),
        model: TurbineModelManager::new(Arc::clone(&store)),
        store,
    }
}

/// A role granted in the global group answers unscoped queries; a
/// role granted in an ordinary group does not leak into them.
#[test]
fn global_and_scoped_grants_stay_apart() {
    let w = world();
    let alice = w.users.add(User::new("alice")).expect("user");
    let crew = w.groups.add(Group::new("crew")).expect("group");
    let admin = w.roles.add(Role::new("admin")).expect("role");
    let pilot = w.roles.add(Role::new("pilot")).expect("role");
    let global = w.model.global_group().expect("global");

    w.model.grant(&alice, &global, &admin).expect("global grant");
    w.model.grant(&alice, &crew, &pilot).expect("scoped grant");

    let acl = w.model.acl_for(&alice).expect("acl");
    assert!(acl.has_role(&admin));
    assert!(!acl.has_role(&pilot));
    assert!(acl.has_role_in(&pilot, &crew));
    assert!(acl.has_role_name("admin"));
}

/// The global group is an ordinary persisted group under the default
/// name, created once and shared by every manager on the store.
#[test]
fn global_group_is_shared_and_stable() {
    let w = world();
    let other = TurbineModelManager::new(Arc::clone(&w.store));

    let a = w.model.global_group().expect("first");
    let b = other.global_group().expect("second");
    assert_eq!(a.id(), b.id());
    assert_eq!(a.name(), GLOBAL_GROUP_NAME);
    assert!(w.groups.check_exists_name(GLOBAL_GROUP_NAME).expect("probe"));
}

/// One relation record backs all three index sides: revoking through
/// the role side must make the user and group sides agree instantly.
#[test]
fn relation_record_is_consistent_across_sides() {
    let w = world();
    let alice = w.users.add(User::new("alice")).expect("user");
    let bob = w.users.add(User::new("bob")).expect("user");
    let crew = w.groups.add(Group::new("crew")).expect("group");
    let pilot = w.roles.add(Role::new("pilot")).expect("role");

    w.model.grant(&alice, &crew, &pilot).expect("grant");
    w.model.grant(&bob, &crew, &pilot).expect("grant");

    w.model.revoke_all_role(&pilot).expect("revoke all");
    assert!(w.store.relations_of_user(&alice).expect("rels").is_empty());
    assert!(w.store.relations_of_user(&bob).expect("rels").is_empty());
    assert!(!w.model.acl_for(&alice).expect("acl").has_role_in(&pilot, &crew));
}

/// Promoting a user swaps the role in place: every relation keeps its
/// group scope, only the role changes.
#[test]
fn promotion_replaces_the_role_everywhere() {
    let w = world();
    let alice = w.users.add(User::new("alice")).expect("user");
    let crew = w.groups.add(Group::new("crew")).expect("group");
    let ground = w.groups.add(Group::new("ground")).expect("group");
    let pilot = w.roles.add(Role::new("pilot")).expect("role");
    let captain = w.roles.add(Role::new("captain")).expect("role");

    w.model.grant(&alice, &crew, &pilot).expect("grant");
    w.model.grant(&alice, &ground, &pilot).expect("grant");

    w.model.replace(&alice, &pilot, &captain).expect("replace");

    let acl = w.model.acl_for(&alice).expect("acl");
    assert!(acl.has_role_in(&captain, &crew));
    assert!(acl.has_role_in(&captain, &ground));
    assert!(!acl.has_role_in(&pilot, &crew));
    assert!(!acl.has_role_in(&pilot, &ground));
}
