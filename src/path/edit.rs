use super::{JsonPath, PathSegment, get_at_mut};
use crate::error::PathError;
use serde_json::{Map, Value};

/// Returns a copy of `origin` with every `(path, value)` written in order.
///
/// Missing intermediate containers are created (an object, or an array when the
/// next step is an index). Writing one past the end of an array appends.
pub fn json_set<I>(origin: &Value, updates: I) -> Result<Value, PathError>
where
    I: IntoIterator<Item = (JsonPath, Value)>,
{
    let mut result = origin.clone();
    for (path, value) in updates {
        set_one(&mut result, &path, value)?;
    }
    Ok(result)
}

/// Returns a copy of `origin` with every value spliced into an array.
///
/// Each path must end in an index and its parent must be an array; anything
/// else is a caller error.
pub fn json_insert<I>(origin: &Value, inserts: I) -> Result<Value, PathError>
where
    I: IntoIterator<Item = (JsonPath, Value)>,
{
    let mut result = origin.clone();
    for (path, value) in inserts {
        let index = path
            .last()
            .and_then(PathSegment::as_index)
            .ok_or_else(|| PathError::InsertNotIndexed(path.to_string()))?;
        let list_path = path.parent();
        let list = get_at_mut(&mut result, &list_path)
            .and_then(Value::as_array_mut)
            .ok_or_else(|| PathError::NotAnArray(list_path.to_string()))?;
        if index > list.len() {
            return Err(PathError::IndexOutOfBounds {
                path: list_path.to_string(),
                index,
                len: list.len(),
            });
        }
        list.insert(index, value);
    }
    Ok(result)
}

/// Returns a copy of `origin` without the value at `path`. Array elements are
/// spliced out; removing something that is not there leaves the tree unchanged.
pub fn json_remove(origin: &Value, path: &JsonPath) -> Result<Value, PathError> {
    let last = path.last().ok_or(PathError::RemoveRoot)?;
    let mut result = origin.clone();
    let Some(parent) = get_at_mut(&mut result, &path.parent()) else {
        return Ok(result);
    };
    match (last, parent) {
        (PathSegment::Field(name), Value::Object(map)) => {
            map.remove(name);
        }
        (PathSegment::Index(i), Value::Array(items)) => {
            if *i < items.len() {
                items.remove(*i);
            }
        }
        (PathSegment::Field(_), Value::Array(_)) | (PathSegment::Index(_), Value::Object(_)) => {}
        _ => return Err(PathError::NotAContainer(path.to_string())),
    }
    Ok(result)
}

fn set_one(root: &mut Value, path: &JsonPath, value: Value) -> Result<(), PathError> {
    let segments = path.segments();
    let Some((last, ancestors)) = segments.split_last() else {
        *root = value;
        return Ok(());
    };

    let mut current = root;
    for (depth, segment) in ancestors.iter().enumerate() {
        let next_is_index = matches!(segments[depth + 1], PathSegment::Index(_));
        let walked = JsonPath::from_segments(segments[..=depth].to_vec());
        current = descend_or_create(current, segment, next_is_index, &walked)?;
    }

    match last {
        PathSegment::Field(name) => {
            if current.is_null() {
                *current = Value::Object(Map::new());
            }
            let map = current
                .as_object_mut()
                .ok_or_else(|| PathError::NotAContainer(path.to_string()))?;
            map.insert(name.clone(), value);
            Ok(())
        }
        PathSegment::Index(i) => {
            if current.is_null() {
                *current = Value::Array(Vec::new());
            }
            let items = current
                .as_array_mut()
                .ok_or_else(|| PathError::NotAContainer(path.to_string()))?;
            write_index(items, *i, value, path)
        }
    }
}

fn descend_or_create<'v>(
    current: &'v mut Value,
    segment: &PathSegment,
    next_is_index: bool,
    walked: &JsonPath,
) -> Result<&'v mut Value, PathError> {
    let empty = || {
        if next_is_index {
            Value::Array(Vec::new())
        } else {
            Value::Object(Map::new())
        }
    };

    if current.is_null() {
        *current = match segment {
            PathSegment::Field(_) => Value::Object(Map::new()),
            PathSegment::Index(_) => Value::Array(Vec::new()),
        };
    }

    match (segment, current) {
        (PathSegment::Field(name), Value::Object(map)) => {
            let child = map.entry(name.clone()).or_insert_with(empty);
            if child.is_null() {
                *child = empty();
            }
            Ok(child)
        }
        (PathSegment::Index(i), Value::Array(items)) => {
            if *i == items.len() {
                items.push(empty());
            }
            let len = items.len();
            items.get_mut(*i).ok_or_else(|| PathError::IndexOutOfBounds {
                path: walked.parent().to_string(),
                index: *i,
                len,
            })
        }
        _ => Err(PathError::NotAContainer(walked.to_string())),
    }
}

fn write_index(
    items: &mut Vec<Value>,
    index: usize,
    value: Value,
    path: &JsonPath,
) -> Result<(), PathError> {
    if index < items.len() {
        items[index] = value;
        Ok(())
    } else if index == items.len() {
        items.push(value);
        Ok(())
    } else {
        Err(PathError::IndexOutOfBounds {
            path: path.parent().to_string(),
            index,
            len: items.len(),
        })
    }
}
