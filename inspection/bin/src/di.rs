use inspection_application::services::InspectionServiceImplParameters;
use inspection_application::InspectionServiceImpl;
use inspection_infrastructure::readers::parquet::ParquetFooterReaderParameters;
use inspection_infrastructure::ParquetFooterReader;
use shaku::module;

module! {
    pub AppModule {
        components = [
            InspectionServiceImpl,
            ParquetFooterReader
        ],
        providers = []
    }
}

pub fn create_app_module(group_under: u64) -> AppModule {
    AppModule::builder()
        .with_component_parameters::<InspectionServiceImpl>(InspectionServiceImplParameters {
            group_under,
        })
        .with_component_parameters::<ParquetFooterReader>(ParquetFooterReaderParameters {})
        .build()
}
