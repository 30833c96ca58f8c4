use crate::raw::{RawParams, RawValue, parse_index};
use crate::{InputError, InputFile, InputNode, InputTree, RawFiles};
use tracing::trace;

/// Builds the upload tree from the parallel metadata collections.
///
/// The name collection gives the shape: every scalar in it becomes one
/// [`InputFile`], the other four collections are read along the same key path.
/// A bare field (`avatar`) yields the file directly, a level whose keys are
/// all integer indices of files (`photo[0]`, `photo[1]`) yields an ordered
/// [`InputNode::Files`] list, any other level a sub-tree.
///
/// Fields that were never submitted produce no node. Failed uploads produce a
/// node carrying their error code.
///
/// # Errors
///
/// Fails when a path of the name collection is missing in another collection,
/// or when the error or size metadata is not an integer. Both point at a broken
/// server runtime rather than at client input.
pub fn build_file_tree(files: &RawFiles) -> Result<InputTree, InputError> {
    let mut tree = InputTree::new();
    let mut index_path = Vec::new();

    for (key, value) in files.name() {
        match value {
            RawValue::Scalar(_) => tree.merge(key, resolve_file(files, &index_path, key)?),
            RawValue::Map(level) => {
                index_path.push(key);
                let node = rearrange(files, level, &mut index_path)?;
                index_path.pop();
                tree.merge(key, node);
            }
        }
    }

    Ok(tree)
}

fn rearrange<'a>(files: &RawFiles, level: &'a RawParams, index_path: &mut Vec<&'a str>) -> Result<InputNode, InputError> {
    let is_list = !level.is_empty()
        && level.iter().all(|(key, value)| matches!(value, RawValue::Scalar(_)) && parse_index(key).is_some());

    if is_list {
        let list = level.iter().map(|(key, _)| resolve_file(files, index_path, key)).collect::<Result<Vec<_>, _>>()?;
        return Ok(InputNode::Files(list));
    }

    let mut tree = InputTree::new();
    for (key, value) in level {
        match value {
            RawValue::Scalar(_) => tree.merge(key, resolve_file(files, index_path, key)?),
            RawValue::Map(nested) => {
                index_path.push(key);
                let node = rearrange(files, nested, index_path)?;
                index_path.pop();
                tree.merge(key, node);
            }
        }
    }

    Ok(InputNode::Tree(tree))
}

fn resolve_file(files: &RawFiles, index_path: &[&str], key: &str) -> Result<InputFile, InputError> {
    let path = index_path.iter().copied().chain([key]).collect::<Vec<_>>();

    let filename = metadata(files.name(), "name", &path)?;
    let mime_type = metadata(files.mime_type(), "type", &path)?;
    let size = metadata(files.size(), "size", &path)?;
    let tmp_path = metadata(files.tmp_path(), "tmp_path", &path)?;
    let error = metadata(files.error(), "error", &path)?;

    let error_code = error
        .trim()
        .parse::<i32>()
        .map_err(|e| InputError::invalid_file_metadata("error", display_path(&path), e))?;

    let mut file = InputFile::new(key, error_code);
    if let Some(filename) = non_empty(filename) {
        file = file.with_filename(filename);
    }
    if let Some(mime_type) = non_empty(mime_type) {
        file = file.with_mime_type(mime_type);
    }
    if let Some(tmp_path) = non_empty(tmp_path) {
        file = file.with_tmp_path(tmp_path);
    }
    if let Some(size) = non_empty(size.trim()) {
        let size = size.parse::<u64>().map_err(|e| InputError::invalid_file_metadata("size", display_path(&path), e))?;
        file = file.with_size(size);
    }

    trace!(path = %display_path(&path), error_code, "resolved uploaded file");
    Ok(file)
}

fn metadata<'a>(params: &'a RawParams, field: &'static str, path: &[&str]) -> Result<&'a str, InputError> {
    params
        .lookup(path)
        .and_then(RawValue::as_scalar)
        .ok_or_else(|| InputError::file_shape_mismatch(field, display_path(path)))
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

/// Renders `["photo", "0"]` as `photo[0]`.
fn display_path(path: &[&str]) -> String {
    let mut rendered = String::new();
    for (i, key) in path.iter().enumerate() {
        if i == 0 {
            rendered.push_str(key);
        } else {
            rendered.push('[');
            rendered.push_str(key);
            rendered.push(']');
        }
    }
    rendered
}
