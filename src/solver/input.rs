//! Writers for the solver's fixed-layout input files

use {
    crate::{
        model::{atmosphere::COLUMNS, profile::DEFAULT_TEMPERATURE, Model},
        parameters::WaterFlow,
        utils::{flag, sci},
    },
    std::io::{self, Write},
};

pub const HYDRUS1D_DAT: &str = "HYDRUS1D.DAT";
pub const SELECTOR_IN: &str = "SELECTOR.IN";
pub const PROFILE_DAT: &str = "PROFILE.DAT";
pub const ATMOSPH_IN: &str = "ATMOSPH.IN";

const MAX_ITERATIONS: u32 = 10;
const WATER_CONTENT_TOLERANCE: f64 = 0.001;
const HEAD_TOLERANCE: f64 = 1.0;
const INITIAL_STEP: f64 = 0.001;
const MIN_STEP: f64 = 1.0e-5;
const MAX_STEP: f64 = 5.0;

/// Solver flags derived from the boundary condition codes
#[derive(Debug, Clone, Copy, PartialEq)]
struct Boundaries {
    top_inf: bool,
    w_layer: bool,
    kod_top: i32,
    bot_inf: bool,
    free_drainage: bool,
    seepage_face: bool,
    kod_bot: i32,
}

impl Boundaries {
    fn new(flow: &WaterFlow) -> Self {
        let (top_inf, w_layer, kod_top) = match flow.top_boundary {
            0 => (false, false, 1),
            2 => (true, true, -1),
            3 => (true, false, -1),
            4 => (true, false, 1),
            5 => (true, false, -1),
            // constant flux
            _ => (false, false, -1),
        };

        let (bot_inf, free_drainage, seepage_face, kod_bot) = match flow.bottom_boundary {
            0 => (false, false, false, 1),
            2 => (true, false, false, 1),
            3 => (true, false, false, -1),
            4 => (false, true, false, -1),
            6 => (false, false, true, -1),
            // constant flux
            _ => (false, false, false, -1),
        };

        Boundaries {
            top_inf,
            w_layer,
            kod_top,
            bot_inf,
            free_drainage,
            seepage_face,
            kod_bot,
        }
    }

    /// Whether prescribed fluxes have to be listed
    fn constant_fluxes(&self) -> bool {
        (!self.top_inf && self.kod_top == -1)
            || (!self.bot_inf && self.kod_bot == -1 && !self.free_drainage && !self.seepage_face)
    }
}

/// Project summary read by the solver front end
pub fn write_hydrus1d<W: Write>(model: &Model, w: &mut W) -> io::Result<()> {
    let info = &model.info;

    writeln!(w, ";")?;
    writeln!(w, "[Main]")?;
    writeln!(w, "HYDRUS_Version=4")?;
    writeln!(w, "WaterFlow=1")?;
    writeln!(w, "SoluteTransport=0")?;
    writeln!(w, "Unsatchem=0")?;
    writeln!(w, "HP1=0")?;
    writeln!(w, "HeatTransport=0")?;
    writeln!(w, "EquilibriumAdsorption=1")?;
    writeln!(w, "MobileImmobile=0")?;
    writeln!(w, "RootWaterUptake={}", model.root_uptake.is_some() as u8)?;
    writeln!(w, "RootGrowth=0")?;
    writeln!(w, "MaterialNumbers={}", model.materials.len())?;
    writeln!(w, "SubregionNumbers={}", model.profile.layers())?;
    writeln!(w, "SpaceUnit={}", info.units.length)?;
    writeln!(w, "TimeUnit={}", info.units.time)?;
    writeln!(w, "PrintTimes={}", info.time.print_times().len())?;
    writeln!(w, "NumberOfSolutes=0")?;
    writeln!(w, "InitialCondition={}", info.water_flow.initial_water_content as u8)?;
    writeln!(w, ";")?;
    writeln!(w, "[Profile]")?;
    writeln!(w, "NumberOfNodes={}", model.profile.len())?;
    writeln!(w, "ProfileDepth={}", sci(model.profile.depth(), 2))?;
    writeln!(w, "ObservationNodes={}", model.observation_nodes.len())?;
    writeln!(w, "GridVisible=1")?;
    writeln!(w, "SnapToGrid=1")?;
    writeln!(w, "ProfileWidth=80")?;
    writeln!(w, "LeftMargin=40")?;
    writeln!(w, "GridOrgX=0")?;
    writeln!(w, "GridOrgY=0")?;
    writeln!(w, "GridDX=5.E+00")?;
    writeln!(w, "GridDY=5.E+00")?;

    Ok(())
}

/// Run control: units, flags, materials, time and root uptake blocks
pub fn write_selector<W: Write>(model: &Model, w: &mut W) -> io::Result<()> {
    let info = &model.info;
    let bc = Boundaries::new(&info.water_flow);
    let print_times = info.time.print_times();

    writeln!(w, "Pcp_File_Version=4")?;
    writeln!(
        w,
        "*** BLOCK A: BASIC INFORMATION *****************************************"
    )?;
    writeln!(w, "Heading")?;
    writeln!(w, "{}", info.description)?;
    writeln!(
        w,
        "LUnit  TUnit  MUnit  (indicated units are obligatory for all input data)"
    )?;
    writeln!(w, "{}", info.units.length)?;
    writeln!(w, "{}", info.units.time)?;
    writeln!(w, "{}", info.units.mass)?;
    writeln!(
        w,
        "lWat   lChem lTemp  lSink lRoot lShort lWDep lScreen lVariabBC lEquil lInverse"
    )?;
    writeln!(
        w,
        " t     f     f      {}     f     f      f     t       f         t         f",
        flag(model.root_uptake.is_some())
    )?;
    writeln!(
        w,
        "lSnow  lHP1   lMeteo  lVapor lActiveU lFluxes lIrrig  lDummy  lDummy  lDummy"
    )?;
    writeln!(
        w,
        " f       f       f       f       f       t       f       f       f       f"
    )?;
    writeln!(w, "NMat    NLay  CosAlpha")?;
    writeln!(
        w,
        "{:>3}{:>8}{:>8}",
        model.materials.len(),
        model.profile.layers(),
        1
    )?;

    writeln!(
        w,
        "*** BLOCK B: WATER FLOW INFORMATION ************************************"
    )?;
    writeln!(
        w,
        "MaxIt   TolTh   TolH       (maximum number of iterations and tolerances)"
    )?;
    writeln!(
        w,
        "{:>4} {:>8} {:>6}",
        MAX_ITERATIONS, WATER_CONTENT_TOLERANCE, HEAD_TOLERANCE
    )?;
    writeln!(w, "TopInf WLayer KodTop InitCond")?;
    writeln!(
        w,
        " {}     {}      {:>2}       {}",
        flag(bc.top_inf),
        flag(bc.w_layer),
        bc.kod_top,
        flag(info.water_flow.initial_water_content)
    )?;
    writeln!(w, "BotInf qGWLF FreeD SeepF KodBot DrainF  hSeep")?;
    writeln!(
        w,
        " {}     f     {}     {}     {:>2}      f      0",
        flag(bc.bot_inf),
        flag(bc.free_drainage),
        flag(bc.seepage_face),
        bc.kod_bot
    )?;
    if bc.constant_fluxes() {
        writeln!(w, "    rTop     rBot    rRoot")?;
        writeln!(w, "{:>8} {:>8} {:>8}", 0, 0, info.water_flow.root_flux)?;
    }
    writeln!(w, "    hTab1   hTabN")?;
    writeln!(w, "    1e-006   10000")?;
    writeln!(w, "    Model   Hysteresis")?;
    writeln!(w, "      0          0")?;
    writeln!(w, "   thr     ths    Alfa      n         Ks       l")?;
    for (_, material) in model.materials.iter() {
        let v = material.values();
        writeln!(
            w,
            "{:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
            v[0], v[1], v[2], v[3], v[4], v[5]
        )?;
    }

    writeln!(
        w,
        "*** BLOCK C: TIME INFORMATION ******************************************"
    )?;
    writeln!(
        w,
        "        dt       dtMin       dtMax     DMul    DMul2  ItMin ItMax  MPL"
    )?;
    writeln!(
        w,
        "{:>11} {:>11} {:>11} {:>8} {:>8} {:>5} {:>5} {:>5}",
        INITIAL_STEP,
        MIN_STEP,
        MAX_STEP,
        1.3,
        0.7,
        3,
        7,
        print_times.len()
    )?;
    writeln!(w, "      tInit        tMax")?;
    writeln!(w, " {:>10} {:>11}", info.time.initial, info.time.maximum)?;
    writeln!(w, "  lPrintD  nPrintSteps tPrintInterval lEnter")?;
    writeln!(w, "     f           1             1       f")?;
    writeln!(w, "TPrint(1),TPrint(2),...,TPrint(MPL)")?;
    for chunk in print_times.chunks(6) {
        for t in chunk {
            write!(w, " {:>10}", t)?;
        }
        writeln!(w)?;
    }

    if let Some(uptake) = &model.root_uptake {
        writeln!(
            w,
            "*** BLOCK G: ROOT WATER UPTAKE INFORMATION *****************************"
        )?;
        writeln!(
            w,
            "     Model  (0 - Feddes, 1 - S shape)  cRootMax    OmegaC"
        )?;
        writeln!(
            w,
            "{:>10} {:>34} {:>9}",
            uptake.model, uptake.root_max, uptake.omega_c
        )?;
        writeln!(
            w,
            "       P0       P2H       P2L       P3          r2H        r2L"
        )?;
        writeln!(
            w,
            "{:>9} {:>9} {:>9} {:>9} {:>12} {:>10}",
            uptake.p0, uptake.p2h, uptake.p2l, uptake.p3, uptake.r2h, uptake.r2l
        )?;
        writeln!(w, "POptm(1),POptm(2),...,POptm(NMat)")?;
        for poptm in &uptake.poptm {
            write!(w, " {:>7}", poptm)?;
        }
        writeln!(w)?;
    }

    writeln!(
        w,
        "*** END OF INPUT FILE 'SELECTOR.IN' ************************************"
    )?;

    Ok(())
}

/// Nodal discretisation, initial condition and observation nodes
pub fn write_profile<W: Write>(model: &Model, w: &mut W) -> io::Result<()> {
    let nodes = model.profile.nodes();

    writeln!(w, "Pcp_File_Version=4")?;
    writeln!(w, "    2")?;
    for (i, node) in [nodes[0], nodes[nodes.len() - 1]].iter().enumerate() {
        writeln!(
            w,
            "{:>5} {:>13} {:>13} {:>13} {:>13}",
            i + 1,
            sci(node.depth, 6),
            sci(1.0, 6),
            sci(1.0, 6),
            sci(1.0, 6)
        )?;
    }
    writeln!(
        w,
        "{:>5}    0    0    1 x         h      Mat  Lay      Beta           Axz            Bxz            Dxz          Temp          Conc",
        nodes.len()
    )?;
    for (i, node) in nodes.iter().enumerate() {
        writeln!(
            w,
            "{:>5} {:>13} {:>13} {:>4} {:>4} {:>13} {:>13} {:>13} {:>13} {:>13}",
            i + 1,
            sci(node.depth, 6),
            sci(node.head, 6),
            node.material,
            node.layer,
            sci(node.beta, 6),
            sci(1.0, 6),
            sci(1.0, 6),
            sci(1.0, 6),
            sci(DEFAULT_TEMPERATURE, 6)
        )?;
    }

    writeln!(w, "{:>5}", model.observation_nodes.len())?;
    for observation in &model.observation_nodes {
        write!(w, "{:>5}", observation.node)?;
    }
    writeln!(w)?;

    Ok(())
}

/// Time-variable boundary records, one per forcing row
pub fn write_atmosphere<W: Write>(model: &Model, w: &mut W) -> io::Result<()> {
    let atmosphere = match &model.atmosphere {
        Some(atmosphere) => atmosphere,
        None => return Ok(()),
    };

    writeln!(w, "Pcp_File_Version=4")?;
    writeln!(
        w,
        "*** BLOCK I: ATMOSPHERIC INFORMATION  **********************************"
    )?;
    writeln!(
        w,
        "   MaxAL                    (MaxAL = number of atmospheric data-records)"
    )?;
    writeln!(w, "{:>7}", atmosphere.len())?;
    writeln!(
        w,
        " DailyVar  SinusVar  lLay  lBCCycles lInterc lDummy  lDummy  lDummy  lDummy  lDummy"
    )?;
    writeln!(
        w,
        "       f       f       f       f       f       f       f       f       f       f"
    )?;
    writeln!(
        w,
        " hCritS                 (max. allowed pressure head at the soil surface)"
    )?;
    writeln!(w, "      0")?;
    for (name, _) in COLUMNS.iter() {
        write!(w, " {:>11}", name)?;
    }
    writeln!(w)?;
    for row in atmosphere.table().data().outer_iter() {
        for x in row.iter() {
            write!(w, " {:>11}", x)?;
        }
        writeln!(w)?;
    }
    writeln!(
        w,
        "end*** END OF INPUT FILE 'ATMOSPH.IN' **********************************"
    )?;

    Ok(())
}

#[cfg(test)]
mod test {
    use {
        super::*,
        crate::{
            model::{atmosphere::Atmosphere, profile::Profile, uptake::RootUptake, Assembly},
            parameters::{Parameters, TimeInfo},
            table::Table,
        },
    };

    fn default_forcing() -> Table {
        Table::from_columns(vec![
            ("tAtm".into(), (1..=730).map(f64::from).collect()),
            ("Prec".into(), vec![0.25; 730]),
        ])
        .unwrap()
    }

    fn model_with(time: TimeInfo, forcing: &Table) -> Model {
        let mut params = Parameters::default();
        params.model.time = time;
        Assembly::new(params.model)
            .with_materials(params.materials)
            .unwrap()
            .with_profile(Profile::create(&params.profile).unwrap())
            .unwrap()
            .with_atmosphere(Atmosphere::from_forcing(forcing).unwrap())
            .unwrap()
            .with_observation_depths(&params.observation_depths)
            .unwrap()
            .with_root_uptake(RootUptake::default())
            .unwrap()
            .finish()
            .unwrap()
    }

    fn model() -> Model {
        model_with(TimeInfo::default(), &default_forcing())
    }

    fn render_model<F: Fn(&Model, &mut Vec<u8>) -> io::Result<()>>(model: &Model, write: F) -> String {
        let mut buf = vec![];
        write(model, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn render<F: Fn(&Model, &mut Vec<u8>) -> io::Result<()>>(write: F) -> String {
        render_model(&model(), write)
    }

    fn numbers(line: &str) -> Vec<f64> {
        line.split_whitespace().map(|t| t.parse().unwrap()).collect()
    }

    #[test]
    fn long_forcing_values_stay_separate() {
        let forcing = Table::from_columns(vec![
            ("tAtm".into(), vec![1.0, 2.0]),
            ("Prec".into(), vec![0.123456789012345, 0.0]),
            ("rSoil".into(), vec![0.0876543210987, 1.0 / 3.0]),
        ])
        .unwrap();
        let time = TimeInfo {
            maximum: 2.0,
            ..TimeInfo::default()
        };

        let atmosphere = render_model(&model_with(time, &forcing), |m, w| write_atmosphere(m, w));
        let lines = atmosphere.lines().collect::<Vec<_>>();

        assert_eq!(
            numbers(lines[9]),
            vec![1.0, 0.123456789012345, 0.0876543210987, 0.0, 100000.0, 0.0, 0.0, 0.0]
        );
        assert_eq!(
            numbers(lines[10]),
            vec![2.0, 0.0, 1.0 / 3.0, 0.0, 100000.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn fractional_print_times_stay_separate() {
        let time = TimeInfo {
            maximum: 1.0,
            print_interval: 0.1,
            ..TimeInfo::default()
        };
        let expected = time.print_times();
        assert_eq!(expected.len(), 10);

        let selector = render_model(&model_with(time, &default_forcing()), |m, w| {
            write_selector(m, w)
        });
        let lines = selector.lines().collect::<Vec<_>>();

        let mpl = lines
            .iter()
            .position(|l| l.starts_with("TPrint(1)"))
            .unwrap();
        let printed = lines[mpl + 1..]
            .iter()
            .take_while(|l| !l.starts_with("***"))
            .flat_map(|l| numbers(l))
            .collect::<Vec<_>>();
        assert_eq!(printed, expected);

        let step = lines.iter().position(|l| l.trim_start().starts_with("dt")).unwrap();
        assert_eq!(numbers(lines[step + 1]).len(), 8);
        assert_eq!(numbers(lines[step + 3]), vec![0.0, 1.0]);
    }

    #[test]
    fn selector_blocks() {
        let selector = render(|m, w| write_selector(m, w));
        let lines = selector.lines().collect::<Vec<_>>();

        assert_eq!(lines[3], "Root uptake with meteorological data");
        assert_eq!(&lines[5..8], &["cm", "days", "mmol"]);
        assert_eq!(lines[13], "  4       4       1");
        assert!(selector.contains(" t     f      -1       f\n"));
        assert!(selector.contains(" t     f     f     f      1      f      0\n"));
        assert!(!selector.contains("rTop"));
        assert!(selector.contains("  0.0364   0.3766  0.01396    1.562    145.8     0.05\n"));
        assert!(selector.contains("          0         730\n"));
        assert!(selector.contains("*** BLOCK G"));
        assert!(selector.contains("\n     -25     -25     -25     -25\n"));
        assert!(selector.ends_with("*** END OF INPUT FILE 'SELECTOR.IN' ************************************\n"));

        let mpl = lines
            .iter()
            .position(|l| l.starts_with("TPrint(1)"))
            .unwrap();
        let printed = lines[mpl + 1..]
            .iter()
            .take_while(|l| !l.starts_with("***"))
            .flat_map(|l| l.split_whitespace())
            .collect::<Vec<_>>();
        assert_eq!(printed.len(), 73);
        assert_eq!(printed[8], "90");
    }

    #[test]
    fn constant_flux_lists_rates() {
        let flow = WaterFlow {
            top_boundary: 1,
            bottom_boundary: 4,
            ..WaterFlow::default()
        };
        let bc = Boundaries::new(&flow);
        assert!(bc.constant_fluxes());
        assert!(bc.free_drainage);

        let bc = Boundaries::new(&WaterFlow::default());
        assert!(!bc.constant_fluxes());
        assert_eq!((bc.kod_top, bc.kod_bot), (-1, 1));
    }

    #[test]
    fn profile_nodes() {
        let profile = render(|m, w| write_profile(m, w));
        let lines = profile.lines().collect::<Vec<_>>();

        assert_eq!(lines.len(), 1 + 1 + 2 + 1 + 601 + 2);
        assert!(lines[4].starts_with("  601    0    0    1 x"));
        assert_eq!(
            lines[5],
            "    1  0.000000e+00 -6.000000e+01    1    1  0.000000e+00  1.000000e+00  1.000000e+00  1.000000e+00  2.000000e+01"
        );
        assert!(lines[5 + 600].starts_with("  601 -6.000000e+02 -6.000000e+01    4    4"));
        assert_eq!(lines[606], "    9");
        assert_eq!(lines[607], "   11   31   51   91  151  251  351  451  551");
    }

    #[test]
    fn atmosphere_records() {
        let atmosphere = render(|m, w| write_atmosphere(m, w));
        let lines = atmosphere.lines().collect::<Vec<_>>();

        assert_eq!(lines[3].trim(), "730");
        assert_eq!(
            lines[8].split_whitespace().collect::<Vec<_>>(),
            vec!["tAtm", "Prec", "rSoil", "rRoot", "hCritA", "rB", "hB", "ht"]
        );
        assert_eq!(
            lines[9].split_whitespace().collect::<Vec<_>>(),
            vec!["1", "0.25", "0", "0", "100000", "0", "0", "0"]
        );
        assert_eq!(lines.len(), 9 + 730 + 1);
        assert!(lines[lines.len() - 1].starts_with("end"));
    }

    #[test]
    fn project_summary() {
        let summary = render(|m, w| write_hydrus1d(m, w));

        assert!(summary.contains("RootWaterUptake=1\n"));
        assert!(summary.contains("MaterialNumbers=4\n"));
        assert!(summary.contains("NumberOfNodes=601\n"));
        assert!(summary.contains("ProfileDepth=6.00e+02\n"));
        assert!(summary.contains("ObservationNodes=9\n"));
    }
}
