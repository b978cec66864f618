use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::{OutputDirs, Split};
use crate::utils::create_output_directory;

pub const DATASET_YAML: &str = "dataset.yaml";
pub const CLASS_MAPPING: &str = "class_mapping.txt";

/// Set up the directory structure for YOLO dataset output
pub fn setup_output_directories(root: &Path) -> Result<OutputDirs> {
    let output_dirs = OutputDirs::new(root);
    for split in Split::ALL {
        create_output_directory(output_dirs.images_dir(split))?;
        create_output_directory(output_dirs.labels_dir(split))?;
    }
    Ok(output_dirs)
}

/// Render the dataset descriptor consumed by the detection trainer
pub fn render_dataset_yaml(absolute_root: &Path, class_names: &[String]) -> String {
    let mut yaml_content = format!("path: {}\n", absolute_root.to_string_lossy());
    for split in Split::ALL {
        yaml_content.push_str(&format!(
            "{}: images/{}\n",
            split.dir_name(),
            split.dir_name()
        ));
    }
    yaml_content.push_str(&format!("\nnc: {}\nnames:\n", class_names.len()));
    for (id, name) in class_names.iter().enumerate() {
        yaml_content.push_str(&format!("    {}: {}\n", id, name));
    }
    yaml_content
}

/// Create the dataset.yaml file for YOLO training
pub fn create_dataset_yaml(root: &Path, class_names: &[String]) -> Result<PathBuf> {
    let absolute_path = fs::canonicalize(root).map_err(|e| Error::io(root, e))?;
    let dataset_yaml_path = root.join(DATASET_YAML);
    write_text(&dataset_yaml_path, &render_dataset_yaml(&absolute_path, class_names))?;
    Ok(dataset_yaml_path)
}

/// Write a human-readable `id: name` listing of the classes
pub fn create_class_mapping(root: &Path, class_names: &[String]) -> Result<PathBuf> {
    let mut content = String::from("DeepPCB Class Mapping (YOLO format):\n");
    content.push_str("=====================================\n");
    for (id, name) in class_names.iter().enumerate() {
        content.push_str(&format!("{}: {}\n", id, name));
    }
    let path = root.join(CLASS_MAPPING);
    write_text(&path, &content)?;
    Ok(path)
}

fn write_text(path: &Path, content: &str) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(content.as_bytes())
        .and_then(|_| writer.flush())
        .map_err(|e| Error::io(path, e))
}
