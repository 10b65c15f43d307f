use gantry_ecs::{EcmError, Entity, EntityComponentManager, Filter, ParentEntity};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Model;

#[derive(Debug, Clone, PartialEq)]
struct Name(String);

impl Name {
    fn new(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// Mimics the runner's purge point between two ticks.
fn purge(ecm: &mut EntityComponentManager) -> Vec<Entity> {
    let removed = ecm.process_remove_entity_requests();
    ecm.clear_new_entities();
    ecm.clear_changed_components();
    removed
}

#[test]
fn test_removed_entities_stay_readable_until_purge() {
    let mut ecm = EntityComponentManager::new();
    let kept = ecm.create_entity();
    let doomed = ecm.create_entity();
    ecm.create_component(kept, Name::new("kept")).unwrap();
    ecm.create_component(doomed, Name::new("doomed")).unwrap();

    ecm.request_remove_entity(doomed, true);
    let created_after = ecm.create_entity();
    ecm.create_component(created_after, Name::new("late")).unwrap();
    ecm.request_remove_entity(created_after, false);

    assert!(ecm.has_entity(doomed));
    assert!(ecm.is_marked_for_removal(doomed));
    assert_eq!(ecm.component::<Name>(doomed), Some(&Name::new("doomed")));
    assert_eq!(ecm.query::<(Name,)>().count(), 3);
    let mut removed = Vec::new();
    ecm.each_removed::<(Name,), _>(|entity, _| removed.push(entity));
    assert_eq!(removed, vec![doomed, created_after]);

    assert_eq!(purge(&mut ecm), vec![doomed, created_after]);

    assert!(!ecm.has_entity(doomed));
    assert_eq!(ecm.component::<Name>(doomed), None);
    let names: Vec<_> = ecm.query::<(Name,)>().map(|(entity, _)| entity).collect();
    assert_eq!(names, vec![kept]);
    assert_eq!(ecm.entity_count(), 1);
    assert!(!ecm.has_entities_marked_for_removal());
}

#[test]
fn test_duplicate_removal_is_idempotent() {
    let mut ecm = EntityComponentManager::new();
    let entity = ecm.create_entity();

    ecm.request_remove_entity(entity, true);
    ecm.request_remove_entity(entity, true);
    ecm.request_remove_entity(entity, false);

    assert_eq!(purge(&mut ecm), vec![entity]);
    assert!(purge(&mut ecm).is_empty());

    // Entity is gone, so this is a warning and a no-op.
    ecm.request_remove_entity(entity, true);
    assert!(!ecm.has_entities_marked_for_removal());
}

#[test]
fn test_recursive_removal() {
    let mut ecm = EntityComponentManager::new();
    let model = ecm.create_entity();
    let link = ecm.create_entity();
    let nested = ecm.create_entity();
    let other = ecm.create_entity();
    ecm.create_component(link, ParentEntity(model)).unwrap();
    ecm.create_component(nested, ParentEntity(link)).unwrap();

    ecm.request_remove_entity(link, false);
    assert!(!ecm.is_marked_for_removal(nested));

    ecm.request_remove_entity(model, true);
    assert_eq!(purge(&mut ecm), vec![model, link, nested]);
    assert!(ecm.has_entity(other));
}

#[test]
fn test_entity_by_components() {
    let mut ecm = EntityComponentManager::new();
    let filters = || [Filter::has::<Model>(), Filter::eq(Name::new("foo"))];

    assert_eq!(ecm.entity_by_components(&filters()), Entity::NULL);

    let bar = ecm.create_entity();
    ecm.create_component(bar, Model).unwrap();
    ecm.create_component(bar, Name::new("bar")).unwrap();
    let unnamed_foo = ecm.create_entity();
    ecm.create_component(unnamed_foo, Name::new("foo")).unwrap();
    assert_eq!(ecm.entity_by_components(&filters()), Entity::NULL);

    let foo = ecm.create_entity();
    ecm.create_component(foo, Model).unwrap();
    ecm.create_component(foo, Name::new("foo")).unwrap();

    let found = ecm.entity_by_components(&filters());
    assert_eq!(found, foo);
    assert_eq!(ecm.entity_by_components(&filters()), found);
    assert_eq!(ecm.entities_by_components(&[Filter::has::<Model>()]), vec![bar, foo]);
}

#[test]
fn test_children_by_components() {
    let mut ecm = EntityComponentManager::new();
    let first = ecm.create_entity();
    let second = ecm.create_entity();
    let child = ecm.create_entity();
    ecm.create_component(child, ParentEntity(second)).unwrap();
    ecm.create_component(child, Name::new("child")).unwrap();

    let filters = [Filter::eq(Name::new("child"))];
    assert!(ecm.children_by_components(first, &filters).is_empty());
    assert_eq!(ecm.children_by_components(second, &filters), vec![child]);
    assert_eq!(ecm.parent_entity(child), Some(second));
}

#[test]
fn test_component_on_missing_entity() {
    let mut ecm = EntityComponentManager::new();
    let missing = Entity::from_raw(42);

    assert_eq!(
        ecm.create_component(missing, Model),
        Err(EcmError::NoSuchEntity(missing)),
    );
    assert_eq!(
        ecm.create_component(Entity::NULL, Model),
        Err(EcmError::NullEntity),
    );
    assert_eq!(ecm.entity_count(), 0);
}

#[test]
fn test_detach_from_missing_entity() {
    let mut ecm = EntityComponentManager::new();
    let model = ecm.create_entity();
    ecm.create_component(model, Model).unwrap();

    assert_eq!(ecm.remove_component::<Model>(Entity::from_raw(42)), None);
    assert_eq!(ecm.remove_component::<Model>(Entity::NULL), None);
    assert_eq!(ecm.component::<Model>(model), Some(&Model));

    ecm.request_remove_entity(model, false);
    purge(&mut ecm);
    assert_eq!(ecm.remove_component::<Model>(model), None);
    assert_eq!(ecm.entity_count(), 0);
}

#[test]
fn test_entity_ids_are_never_reused() {
    let mut ecm = EntityComponentManager::new();
    let first = ecm.create_entity();
    ecm.request_remove_entity(first, true);
    purge(&mut ecm);

    let second = ecm.create_entity();
    assert!(second > first);
}

#[test]
fn test_each_and_tracking() {
    let mut ecm = EntityComponentManager::new();
    let old = ecm.create_entity();
    ecm.create_component(old, 1_u32).unwrap();
    purge(&mut ecm);
    assert!(!ecm.has_new_entities());
    assert!(!ecm.component_type_changed::<u32>());

    let new = ecm.create_entity();
    ecm.create_component(new, 2_u32).unwrap();
    assert!(ecm.has_new_entities());
    assert!(ecm.component_type_changed::<u32>());

    ecm.each_mut::<u32, _>(|_, value| *value *= 10);

    let mut all = Vec::new();
    ecm.each::<(u32,), _>(|entity, (value,): (&u32,)| all.push((entity, *value)));
    assert_eq!(all, vec![(old, 10), (new, 20)]);

    let mut fresh = Vec::new();
    ecm.each_new::<(u32,), _>(|entity, _| fresh.push(entity));
    assert_eq!(fresh, vec![new]);
}
