#![cfg(test)]

use super::{super::entity::EntityAllocator, *};

#[test]
fn test_insertion() {
    let mut entities = EntityAllocator::new();
    let mut storage = ComponentStorage::new();

    let entity = entities.allocate();
    let component = "foo";

    assert_eq!(storage.insert(entity, component), None);
    assert!(storage.attached(entity));
    assert_eq!(storage[entity], "foo");

    storage.remove(entity);
    assert!(!storage.attached(entity));
    assert_eq!(storage.get(entity), None);
}

#[test]
fn test_overwrite() {
    let mut entities = EntityAllocator::new();
    let mut storage = ComponentStorage::new();

    let entity = entities.allocate();
    assert_eq!(storage.insert(entity, 123), None);
    storage.clear_changed();

    assert_eq!(storage.insert(entity, 456), Some(123));
    assert!(!storage.changed(), "overwrite is not a structural change");
    assert_eq!(storage.len(), 1);
    assert_eq!(storage.remove(entity), Some(456));
    assert!(storage.changed());
    assert_eq!(storage.remove(entity), None);
}

#[test]
#[should_panic]
fn test_index() {
    let mut entities = EntityAllocator::new();
    let mut storage = ComponentStorage::new();

    let entity = entities.allocate();
    storage.insert(entity, 1);
    storage[entity] = 0;
    assert_eq!(storage[entity], 0);

    let entity = entities.allocate();
    let _component = storage[entity];
}

#[test]
fn test_iterator() {
    let mut entities = EntityAllocator::new();
    let mut storage = ComponentStorage::new();

    let _entities: Vec<_> = (0..100)
        .map(|int| {
            let entity = entities.allocate();
            storage.insert(entity, int);
            entity
        })
        .collect();

    for (_, component) in storage.iter_mut() {
        *component += 10;
    }
    let mut values: Vec<_> = storage.iter().map(|(_, component)| *component).collect();
    values.sort_unstable();
    assert_eq!(values, (10..110).collect::<Vec<_>>());
}

#[test]
fn test_removal_keeps_entities_paired() {
    let mut entities = EntityAllocator::new();
    let mut storage = ComponentStorage::new();

    let all: Vec<_> = (0..10)
        .map(|int| {
            let entity = entities.allocate();
            storage.insert(entity, int);
            (entity, int)
        })
        .collect();
    for &(entity, _) in all.iter().step_by(3) {
        storage.remove(entity);
    }

    assert_eq!(storage.len(), 6);
    for (entity, component) in storage.iter() {
        let &(_, expected) = all.iter().find(|(e, _)| *e == entity).unwrap();
        assert_eq!(*component, expected);
    }
    for &(entity, int) in &all {
        assert_eq!(storage.get(entity).copied(), (int % 3 != 0).then_some(int));
    }
}

#[test]
fn test_registry_remove_all() {
    let mut entities = EntityAllocator::new();
    let mut registry = ComponentRegistry::new();

    let first = entities.allocate();
    let second = entities.allocate();
    registry.insert(first, 1_u32);
    registry.insert(first, "first");
    registry.insert(second, 2_u32);

    assert_eq!(registry.remove_all(first), 2);
    assert!(!registry.attached::<u32>(first));
    assert!(!registry.attached::<&str>(first));
    assert_eq!(registry.get::<u32>(second), Some(&2));
    assert_eq!(registry.remove_all(first), 0);
}

#[test]
fn test_registry_changed() {
    let mut entities = EntityAllocator::new();
    let mut registry = ComponentRegistry::new();

    let entity = entities.allocate();
    assert!(!registry.changed::<u8>());

    registry.insert(entity, 1_u8);
    assert!(registry.changed::<u8>());
    assert!(!registry.changed::<u16>());

    registry.clear_changed();
    assert!(!registry.changed::<u8>());

    *registry.get_mut::<u8>(entity).unwrap() = 2;
    assert!(!registry.changed::<u8>());
    assert_eq!(registry.remove::<u8>(entity), Some(2));
    assert!(registry.changed::<u8>());
}
