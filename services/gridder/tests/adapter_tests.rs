//! Request flow tests with local retrieval and staging.

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use gridder_service::{
    GridRequest, GridSettings, GridderAdapter, GridderConfig, HttpRetriever, ObjectStager,
    Stager, NETCDF4_CONTENT_TYPE,
};
use netcdf_tree::{read_tree, GroupPath, Scalar};
use test_utils::{
    diagonal_indices, float_variable, groups, index_group, short_names, smap_input, write_input,
};

fn spl2smp_granule(dir: &Path, name: &str) -> String {
    let (rows, cols) = diagonal_indices(3);
    let group = index_group(groups::SOIL_MOISTURE, rows, cols, "")
        .with_variable(float_variable("soil_moisture", vec![0.25, 0.5, 0.75]));
    let tree = smap_input(short_names::SPL2SMP, vec![group]);
    write_input(&tree, dir, name).display().to_string()
}

fn adapter<S: Stager>(stager: S) -> GridderAdapter<HttpRetriever, S> {
    let settings = GridSettings::from_config(&GridderConfig::default()).unwrap();
    GridderAdapter::new(
        HttpRetriever::new(Duration::from_secs(10)).unwrap(),
        stager,
        settings,
    )
}

#[tokio::test]
async fn test_grid_and_stage_local() {
    let dir = tempfile::tempdir().unwrap();
    let source = spl2smp_granule(dir.path(), "SMAP_L2_SM_P_36365_D_test.h5");
    let staging = dir.path().join("staged");

    let request = GridRequest {
        source: format!("file://{}", source),
        staging_location: staging.display().to_string(),
        access_token: None,
    };
    let output = adapter(ObjectStager).process(&request).await.unwrap();

    assert_eq!(output.title, "SMAP_L2_SM_P_36365_D_test_regridded.nc");
    assert_eq!(output.media_type, NETCDF4_CONTENT_TYPE);
    let staged = staging.join("SMAP_L2_SM_P_36365_D_test_regridded.nc");
    assert_eq!(output.url, format!("file://{}", staged.display()));

    let tree = read_tree(&staged).unwrap();
    let soil_moisture = tree
        .variable(&GroupPath::parse("Soil_Moisture_Retrieval_Data/soil_moisture"))
        .unwrap();
    assert_eq!(soil_moisture.shape(), [406, 964]);
    assert_eq!(soil_moisture.data.get(964 + 1), Some(Scalar::F32(0.5)));
    assert_eq!(soil_moisture.data.get(1), Some(Scalar::F32(-9999.0)));
}

/// Records staging calls without writing anywhere.
#[derive(Default)]
struct RecordingStager {
    calls: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl Stager for RecordingStager {
    async fn stage(
        &self,
        local: &Path,
        target_name: &str,
        content_type: &str,
        location: &str,
    ) -> Result<String> {
        assert!(local.exists());
        assert_eq!(content_type, NETCDF4_CONTENT_TYPE);
        self.calls
            .lock()
            .unwrap()
            .push((target_name.to_string(), location.to_string()));
        Ok(format!("{}/{}", location, target_name))
    }
}

#[tokio::test]
async fn test_stager_receives_output_name() {
    let dir = tempfile::tempdir().unwrap();
    let source = spl2smp_granule(dir.path(), "granule.h5");
    let stager = RecordingStager::default();
    let adapter = adapter(stager).with_work_dir(Some(dir.path().to_path_buf()));

    let request = GridRequest {
        source,
        staging_location: "s3://bucket/job".to_string(),
        access_token: Some("token".to_string()),
    };
    let output = adapter.process(&request).await.unwrap();
    assert_eq!(output.url, "s3://bucket/job/granule_regridded.nc");
}

#[tokio::test]
async fn test_unknown_collection_reported() {
    let dir = tempfile::tempdir().unwrap();
    let tree = smap_input("SPL3SMP", vec![]);
    let source = write_input(&tree, dir.path(), "level3.h5");

    let request = GridRequest {
        source: source.display().to_string(),
        staging_location: dir.path().join("staged").display().to_string(),
        access_token: None,
    };
    let err = adapter(RecordingStager::default())
        .process(&request)
        .await
        .unwrap_err();

    assert_eq!(err.category, "smap-l2-gridder");
    assert!(err.message.contains("Failed to grid"), "{}", err.message);
    assert!(
        err.message.ends_with("No collection information for SPL3SMP"),
        "{}",
        err.message
    );
    assert!(!dir.path().join("staged").exists());
}

#[tokio::test]
async fn test_missing_source_reported() {
    let dir = tempfile::tempdir().unwrap();
    let request = GridRequest {
        source: "/nonexistent/granule.h5".to_string(),
        staging_location: dir.path().display().to_string(),
        access_token: None,
    };
    let err = adapter(ObjectStager).process(&request).await.unwrap_err();
    assert!(
        err.message.starts_with("Failed to retrieve /nonexistent/granule.h5"),
        "{}",
        err.message
    );
}
